// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install and uninstall orchestration.
//!
//! Sequence candidate resolution and block patching for the two lifecycle
//! events of the cdj package. Both runs are strictly sequential, and never
//! fail. Whatever happens is summarized in a report whose [`Display`] output
//! is the `[cdj]` tagged console text shown to the user.
//!
//! # Install
//!
//! Skips all file mutation if the user opted out, or if running under
//! continuous integration. Otherwise, each candidate file is tried in order
//! until one of them reports that the block was installed or replaced.
//!
//! # Uninstall
//!
//! Always scans the full listing of well-known shell configuration files,
//! and strips the block from every file that holds one.

use crate::{
    block::MarkedBlock,
    config::{HookEnv, InstallSettings},
    patch::{install_to, is_installed_in, remove_from, InstallOutcome, PatchError, RemoveOutcome},
    shell::{candidate_rc_files, default_rc_files},
};

use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};

/// Tag that prefixes every console status line.
pub const TAG: &str = "[cdj]";

/// Knobs for a single install run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Shell configuration file to try before any detected candidate.
    pub rc_file: Option<PathBuf>,

    /// Install even if environment or settings say to skip.
    pub force: bool,

    /// Hook settings disabled automatic install.
    pub disabled: bool,
}

impl InstallOptions {
    /// Merge hook settings into options.
    ///
    /// An explicit rc file wins over the one from settings.
    pub fn with_settings(mut self, settings: &InstallSettings) -> Self {
        if self.rc_file.is_none() {
            self.rc_file = settings.rc_file.clone();
        }
        self.disabled = settings.skip;
        self
    }
}

/// Why automatic install was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Package manager runs with lifecycle scripts disabled.
    IgnoreScripts,

    /// Continuous integration detected.
    Ci,

    /// Hook settings ask to never install automatically.
    Settings,
}

/// Summary of install run.
#[derive(Debug)]
pub enum InstallReport {
    /// No file was touched.
    Skipped { reason: SkipReason },

    /// Block now lives in a file.
    Done {
        outcome: InstallOutcome,
        failures: Vec<InstallOutcome>,
        home: PathBuf,
    },

    /// Every candidate failed.
    Exhausted { failures: Vec<InstallOutcome> },
}

impl InstallReport {
    /// File that now holds the block, if any.
    pub fn rc_file(&self) -> Option<&Path> {
        match self {
            Self::Done { outcome, .. } => Some(outcome.rc_file()),
            _ => None,
        }
    }
}

impl Display for InstallReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Skipped { reason } => {
                let why = match reason {
                    SkipReason::Settings => "disabled in hook settings",
                    SkipReason::IgnoreScripts | SkipReason::Ci => "ignore-scripts/CI detected",
                };
                writeln!(fmt, "{TAG} Skipping hook install ({why}).")?;
                writeln!(
                    fmt,
                    "{TAG} You can run:  source <(cdj hook)  or  cdj hook >> ~/.zshrc"
                )
            }
            Self::Done { outcome, home, .. } => {
                writeln!(fmt, "{TAG} {outcome}")?;
                writeln!(
                    fmt,
                    "{TAG} Reload your shell or run:  source {}",
                    outcome.rc_file().display()
                )?;
                writeln!(
                    fmt,
                    "{TAG} Tip: to generate aliases without cd'ing, use:  cdj -g >> ~/.bashrc"
                )?;
                writeln!(fmt, "{TAG} Tip: you can always re-install the hook manually with:")?;
                writeln!(fmt, "  cdj hook >> ~/.bashrc      # or ~/.zshrc")?;
                writeln!(
                    fmt,
                    "{TAG} (Your base can be overridden with:  export CDJ_BASE=\"{}\")",
                    home.join("Projects").display()
                )
            }
            Self::Exhausted { .. } => {
                writeln!(fmt, "{TAG} Could not auto-install a shell hook.")?;
                writeln!(fmt, "{TAG} Run one of:")?;
                writeln!(fmt, "  source <(cdj hook)      # current session only")?;
                writeln!(fmt, "  cdj hook >> ~/.bashrc    # persist for bash")?;
                writeln!(fmt, "  cdj hook >> ~/.zshrc     # persist for zsh")
            }
        }
    }
}

/// Install or upgrade block in first workable shell configuration file.
///
/// Never fails. Per-candidate failures are collected into the report.
#[instrument(skip(env, block), level = "debug")]
pub fn install_hook(env: &HookEnv, opts: &InstallOptions, block: &MarkedBlock) -> InstallReport {
    if !opts.force {
        if opts.disabled {
            info!("hook settings disable automatic install");
            return InstallReport::Skipped {
                reason: SkipReason::Settings,
            };
        }

        if env.ignore_scripts {
            info!("lifecycle scripts disabled, skip hook install");
            return InstallReport::Skipped {
                reason: SkipReason::IgnoreScripts,
            };
        }

        if env.ci {
            info!("continuous integration detected, skip hook install");
            return InstallReport::Skipped {
                reason: SkipReason::Ci,
            };
        }
    }

    let mut candidates = Vec::new();
    candidates.extend(opts.rc_file.clone());
    candidates.extend(candidate_rc_files(&env.shell, &env.home));
    let mut seen = HashSet::new();
    candidates.retain(|path| seen.insert(path.clone()));
    debug!("install candidates: {candidates:?}");

    let mut failures = Vec::new();
    for rc_file in candidates {
        let outcome = install_to(&rc_file, block);
        if outcome.is_success() {
            return InstallReport::Done {
                outcome,
                failures,
                home: env.home.clone(),
            };
        }

        failures.push(outcome);
    }

    warn!("no candidate shell configuration file could be patched");
    InstallReport::Exhausted { failures }
}

/// Summary of uninstall run.
#[derive(Debug, Default)]
pub struct UninstallReport {
    /// Files that had a block removed.
    pub removed: Vec<PathBuf>,

    /// Files that could not be processed.
    pub failures: Vec<(PathBuf, PatchError)>,
}

impl UninstallReport {
    /// Check if any file was changed.
    pub fn removed_any(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl Display for UninstallReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for rc_file in &self.removed {
            writeln!(fmt, "{TAG} Removed shell hook from {}", rc_file.display())?;
        }

        for (rc_file, error) in &self.failures {
            writeln!(fmt, "{TAG} Could not clean {}: {error}", rc_file.display())?;
        }

        if !self.removed_any() {
            writeln!(fmt, "{TAG} No shell hook blocks were found to remove.")?;
            writeln!(
                fmt,
                "{TAG} If you still see a cdj() function in your shell, it may be defined \
                 elsewhere (e.g., a custom dotfile)."
            )?;
        }

        writeln!(fmt, "{TAG} Tip: to re-enable later without reinstalling, you can run:")?;
        writeln!(fmt, "  cdj hook >> ~/.zshrc      # or ~/.bashrc")
    }
}

/// Remove block from every well-known shell configuration file.
///
/// Extra files are scanned after the well-known ones. No environment signal
/// suppresses removal. A failure on one file does not stop the scan.
#[instrument(skip(env, block), level = "debug")]
pub fn uninstall_hook(env: &HookEnv, extra: &[PathBuf], block: &MarkedBlock) -> UninstallReport {
    let mut targets = default_rc_files(&env.home);
    targets.extend(extra.iter().cloned());
    let mut seen = HashSet::new();
    targets.retain(|path| seen.insert(path.clone()));

    let mut report = UninstallReport::default();
    for rc_file in targets {
        match remove_from(&rc_file, block) {
            Ok(RemoveOutcome::Removed) => report.removed.push(rc_file),
            Ok(RemoveOutcome::NotFound) => continue,
            Err(err) => {
                error!("{err}");
                report.failures.push((rc_file, err));
            }
        }
    }

    report
}

/// Block state of one shell configuration file.
#[derive(Debug)]
pub struct HookStatus {
    pub rc_file: PathBuf,
    pub state: Result<bool, PatchError>,
}

impl Display for HookStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match &self.state {
            Ok(true) => write!(fmt, "{TAG} installed   {}", self.rc_file.display()),
            Ok(false) => write!(fmt, "{TAG} absent      {}", self.rc_file.display()),
            Err(err) => write!(fmt, "{TAG} unreadable  {}: {err}", self.rc_file.display()),
        }
    }
}

/// Report which candidate files currently hold the block.
pub fn hook_status(env: &HookEnv, block: &MarkedBlock) -> Vec<HookStatus> {
    candidate_rc_files(&env.shell, &env.home)
        .into_iter()
        .map(|rc_file| {
            let state = is_installed_in(&rc_file, block);
            HookStatus { rc_file, state }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{
        env::current_dir,
        fs::{create_dir, read_to_string, write},
    };

    fn block(body: &str) -> MarkedBlock {
        MarkedBlock::new("# BEGIN", "# END", body)
    }

    fn sealed_env(shell: &str) -> anyhow::Result<HookEnv> {
        Ok(HookEnv {
            shell: shell.into(),
            ..HookEnv::new(current_dir()?)
        })
    }

    #[sealed_test]
    fn install_skips_under_ci() -> anyhow::Result<()> {
        let env = HookEnv {
            ci: true,
            ..sealed_env("zsh")?
        };
        let report = install_hook(&env, &InstallOptions::default(), &block("echo hi"));

        assert!(matches!(
            report,
            InstallReport::Skipped {
                reason: SkipReason::Ci
            }
        ));
        assert!(report.to_string().starts_with("[cdj] Skipping hook install"));
        assert!(!env.home.join(".zshrc").exists());

        Ok(())
    }

    #[sealed_test]
    fn install_skips_when_scripts_ignored() -> anyhow::Result<()> {
        let env = HookEnv {
            ignore_scripts: true,
            ..sealed_env("bash")?
        };
        let report = install_hook(&env, &InstallOptions::default(), &block("echo hi"));

        assert!(matches!(
            report,
            InstallReport::Skipped {
                reason: SkipReason::IgnoreScripts
            }
        ));
        assert!(report
            .to_string()
            .starts_with("[cdj] Skipping hook install (ignore-scripts/CI detected)."));
        assert!(!env.home.join(".bashrc").exists());

        Ok(())
    }

    #[sealed_test]
    fn install_forced_ignores_opt_out() -> anyhow::Result<()> {
        let env = HookEnv {
            ignore_scripts: true,
            ..sealed_env("zsh")?
        };
        let opts = InstallOptions {
            force: true,
            ..Default::default()
        };
        let report = install_hook(&env, &opts, &block("echo hi"));

        assert_eq!(report.rc_file(), Some(env.home.join(".zshrc").as_path()));

        Ok(())
    }

    #[sealed_test]
    fn install_falls_through_failing_candidates() -> anyhow::Result<()> {
        let env = sealed_env("/bin/zsh")?;
        create_dir(env.home.join(".zshrc"))?;

        let report = install_hook(&env, &InstallOptions::default(), &block("echo hi"));
        let InstallReport::Done {
            outcome, failures, ..
        } = &report
        else {
            panic!("expected install to succeed, got {report:?}");
        };

        assert_eq!(outcome.rc_file(), env.home.join(".bashrc"));
        assert_eq!(failures.len(), 1);
        let expect = format!(
            "[cdj] Installed shell hook in {}",
            outcome.rc_file().display()
        );
        assert!(report.to_string().starts_with(expect.as_str()));

        Ok(())
    }

    #[sealed_test]
    fn install_prefers_explicit_rc_file() -> anyhow::Result<()> {
        let env = sealed_env("bash")?;
        let opts = InstallOptions {
            rc_file: Some(env.home.join("dotfiles/shellrc")),
            ..Default::default()
        };
        let report = install_hook(&env, &opts, &block("echo hi"));

        assert_eq!(report.rc_file(), opts.rc_file.as_deref());
        assert!(!env.home.join(".bashrc").exists());

        Ok(())
    }

    #[sealed_test]
    fn install_exhausted_gives_guidance() -> anyhow::Result<()> {
        let env = sealed_env("")?;
        for name in [".zshrc", ".bashrc", ".bash_profile"] {
            create_dir(env.home.join(name))?;
        }

        let report = install_hook(&env, &InstallOptions::default(), &block("echo hi"));
        let InstallReport::Exhausted { failures } = &report else {
            panic!("expected every candidate to fail, got {report:?}");
        };

        assert_eq!(failures.len(), 3);
        assert!(report
            .to_string()
            .starts_with("[cdj] Could not auto-install a shell hook."));

        Ok(())
    }

    #[sealed_test]
    fn uninstall_scans_every_file() -> anyhow::Result<()> {
        let env = sealed_env("zsh")?;
        let block = block("echo hi");
        write(env.home.join(".zshrc"), "export FOO=1\n")?;
        install_to(&env.home.join(".zshrc"), &block);
        install_to(&env.home.join(".bash_profile"), &block);

        let report = uninstall_hook(&env, &[], &block);
        let expect = vec![env.home.join(".zshrc"), env.home.join(".bash_profile")];

        assert_eq!(report.removed, expect);
        assert!(report.failures.is_empty());
        assert_eq!(read_to_string(env.home.join(".zshrc"))?, "export FOO=1\n");

        Ok(())
    }

    #[sealed_test]
    fn uninstall_keeps_going_after_failure() -> anyhow::Result<()> {
        let env = sealed_env("zsh")?;
        let block = block("echo hi");
        create_dir(env.home.join(".zshrc"))?;
        write(env.home.join(".bashrc"), format!("export FOO=1\n\n{block}\n"))?;

        let report = uninstall_hook(&env, &[], &block);

        assert_eq!(report.removed, vec![env.home.join(".bashrc")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, env.home.join(".zshrc"));
        assert_eq!(read_to_string(env.home.join(".bashrc"))?, "export FOO=1\n");

        let expect = format!("[cdj] Could not clean {}", env.home.join(".zshrc").display());
        assert!(report.to_string().contains(expect.as_str()));

        Ok(())
    }

    #[sealed_test]
    fn uninstall_without_blocks_says_so() -> anyhow::Result<()> {
        let env = sealed_env("")?;
        let report = uninstall_hook(&env, &[], &block("echo hi"));

        assert!(!report.removed_any());
        assert!(report
            .to_string()
            .starts_with("[cdj] No shell hook blocks were found to remove."));

        Ok(())
    }

    #[sealed_test]
    fn status_lists_installed_files() -> anyhow::Result<()> {
        let env = sealed_env("bash")?;
        let block = block("echo hi");
        install_to(&env.home.join(".bash_profile"), &block);

        let result = hook_status(&env, &block)
            .into_iter()
            .filter(|status| matches!(status.state, Ok(true)))
            .map(|status| status.rc_file)
            .collect::<Vec<_>>();
        assert_eq!(result, vec![env.home.join(".bash_profile")]);

        Ok(())
    }

    #[sealed_test]
    fn install_skips_when_disabled_by_settings() -> anyhow::Result<()> {
        let env = sealed_env("zsh")?;
        let settings = InstallSettings {
            rc_file: None,
            skip: true,
        };
        let opts = InstallOptions::default().with_settings(&settings);
        let report = install_hook(&env, &opts, &block("echo hi"));

        assert!(matches!(
            report,
            InstallReport::Skipped {
                reason: SkipReason::Settings
            }
        ));
        assert!(!env.home.join(".zshrc").exists());

        Ok(())
    }

    #[test]
    fn settings_merge_into_options() {
        let settings = InstallSettings {
            rc_file: Some(PathBuf::from("/home/blah/.zshrc")),
            skip: true,
        };

        let opts = InstallOptions::default().with_settings(&settings);
        assert_eq!(opts.rc_file, settings.rc_file);
        assert!(opts.disabled);

        let explicit = InstallOptions {
            rc_file: Some(PathBuf::from("/tmp/rc")),
            ..Default::default()
        };
        let opts = explicit.with_settings(&settings);
        assert_eq!(opts.rc_file, Some(PathBuf::from("/tmp/rc")));
    }
}
