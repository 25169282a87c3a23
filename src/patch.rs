// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Marked block patching of shell configuration files.
//!
//! Read-modify-write a user's shell configuration file so that it contains,
//! or no longer contains, a given [`MarkedBlock`]. Each operation performs at
//! most one read and one write on a single file. No locking is done, so
//! concurrent edits to the same file by someone else are a race.
//!
//! # Failure Policy
//!
//! Installation never hands an error back to its caller. Any I/O failure is
//! demoted into [`InstallOutcome::Failed`] so that the caller can move on to
//! the next candidate file. Removal returns a regular [`Result`] instead, but
//! callers are expected to report it and keep going.

use crate::block::{InstallAction, MarkedBlock};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Result of installing a block into one shell configuration file.
#[derive(Debug)]
pub enum InstallOutcome {
    /// Fresh block appended to file.
    Installed { rc_file: PathBuf },

    /// Existing block upgraded in place.
    Replaced { rc_file: PathBuf },

    /// File could not be patched.
    Failed { rc_file: PathBuf, error: PatchError },
}

impl InstallOutcome {
    /// File that installation targeted.
    pub fn rc_file(&self) -> &Path {
        match self {
            Self::Installed { rc_file }
            | Self::Replaced { rc_file }
            | Self::Failed { rc_file, .. } => rc_file.as_path(),
        }
    }

    /// Check if file now holds the block.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

impl Display for InstallOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Installed { rc_file } => {
                write!(fmt, "Installed shell hook in {}", rc_file.display())
            }
            Self::Replaced { rc_file } => {
                write!(fmt, "Updated shell hook in {}", rc_file.display())
            }
            Self::Failed { rc_file, error } => {
                write!(fmt, "Could not patch {}: {error}", rc_file.display())
            }
        }
    }
}

/// Result of removing a block from one shell configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Block was excised from file.
    Removed,

    /// File is missing, or holds no block.
    NotFound,
}

/// Install or upgrade block inside of shell configuration file.
///
/// Missing files are treated as empty, and any missing parent directories
/// are created before writing. An existing block is replaced in place.
/// Otherwise, the block is appended to the end of the file. Running this
/// twice with the same block leaves the file exactly as one run would.
#[instrument(skip(block), level = "debug")]
pub fn install_to(rc_file: &Path, block: &MarkedBlock) -> InstallOutcome {
    let rc_file_buf = rc_file.to_path_buf();
    match try_install(rc_file, block) {
        Ok(InstallAction::Installed) => InstallOutcome::Installed {
            rc_file: rc_file_buf,
        },
        Ok(InstallAction::Replaced) => InstallOutcome::Replaced {
            rc_file: rc_file_buf,
        },
        Err(error) => {
            warn!("skip {:?}: {error}", rc_file.display());
            InstallOutcome::Failed {
                rc_file: rc_file_buf,
                error,
            }
        }
    }
}

fn try_install(rc_file: &Path, block: &MarkedBlock) -> Result<InstallAction> {
    let content = read_rc_file(rc_file)?.unwrap_or_default();
    let (next, action) = block.splice_install(&content);

    if next == content {
        debug!("{:?} already holds current block", rc_file.display());
        return Ok(action);
    }

    create_parent_dir(rc_file)?;
    write(rc_file, next.as_bytes()).map_err(|err| PatchError::WriteRcFile {
        source: err,
        rc_file: rc_file.to_path_buf(),
    })?;
    info!("{action} block in {:?}", rc_file.display());

    Ok(action)
}

/// Remove block from shell configuration file.
///
/// Text around the block is kept, with whitespace at the splice point
/// collapsed into a single newline.
///
/// # Errors
///
/// - Return [`PatchError::ReadRcFile`] if file exists but cannot be read.
/// - Return [`PatchError::WriteRcFile`] if patched content cannot be
///   written back.
#[instrument(skip(block), level = "debug")]
pub fn remove_from(rc_file: &Path, block: &MarkedBlock) -> Result<RemoveOutcome> {
    let Some(content) = read_rc_file(rc_file)? else {
        debug!("{:?} does not exist", rc_file.display());
        return Ok(RemoveOutcome::NotFound);
    };

    let Some(next) = block.splice_remove(&content) else {
        debug!("{:?} holds no block", rc_file.display());
        return Ok(RemoveOutcome::NotFound);
    };

    write(rc_file, next.as_bytes()).map_err(|err| PatchError::WriteRcFile {
        source: err,
        rc_file: rc_file.to_path_buf(),
    })?;
    info!("removed block from {:?}", rc_file.display());

    Ok(RemoveOutcome::Removed)
}

/// Check if shell configuration file currently holds block.
///
/// # Errors
///
/// - Return [`PatchError::ReadRcFile`] if file exists but cannot be read.
pub fn is_installed_in(rc_file: &Path, block: &MarkedBlock) -> Result<bool> {
    Ok(read_rc_file(rc_file)?
        .map(|content| block.is_present_in(&content))
        .unwrap_or(false))
}

fn read_rc_file(rc_file: &Path) -> Result<Option<String>> {
    match read_to_string(rc_file) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(PatchError::ReadRcFile {
            source: err,
            rc_file: rc_file.to_path_buf(),
        }),
    }
}

fn create_parent_dir(rc_file: &Path) -> Result<()> {
    // INVARIANT: Bare file names live in the current directory, which exists.
    let Some(parent) = rc_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if parent.exists() {
        return Ok(());
    }

    debug!("create missing directory {:?}", parent.display());
    mkdirp::mkdirp(parent).map_err(|err| PatchError::CreateParentDir {
        source: err,
        parent: parent.to_path_buf(),
    })?;

    Ok(())
}

/// Shell configuration file patching error types.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Shell configuration file cannot be read from.
    #[error("failed to read from shell configuration file at {:?}", rc_file.display())]
    ReadRcFile {
        #[source]
        source: std::io::Error,
        rc_file: PathBuf,
    },

    /// Shell configuration file cannot be written to.
    #[error("failed to write to shell configuration file at {:?}", rc_file.display())]
    WriteRcFile {
        #[source]
        source: std::io::Error,
        rc_file: PathBuf,
    },

    /// Parent directory of shell configuration file cannot be created.
    #[error("failed to create directory at {:?}", parent.display())]
    CreateParentDir {
        #[source]
        source: std::io::Error,
        parent: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PatchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::create_dir;

    fn block(body: &str) -> MarkedBlock {
        MarkedBlock::new("# BEGIN", "# END", body)
    }

    #[sealed_test]
    fn install_to_missing_file_creates_it() -> anyhow::Result<()> {
        let rc_file = Path::new(".zshrc");
        let outcome = install_to(rc_file, &block("echo hi"));

        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
        assert_eq!(read_to_string(rc_file)?, "# BEGIN\necho hi\n# END\n");

        Ok(())
    }

    #[sealed_test]
    fn install_to_creates_missing_parent_dirs() -> anyhow::Result<()> {
        let rc_file = Path::new(".config/fish/config.fish");
        let outcome = install_to(rc_file, &block("echo hi"));

        assert!(outcome.is_success());
        assert_eq!(outcome.rc_file(), rc_file);
        assert!(rc_file.exists());

        Ok(())
    }

    #[sealed_test]
    fn install_to_twice_is_idempotent() -> anyhow::Result<()> {
        let rc_file = Path::new(".bashrc");
        write(rc_file, "export FOO=1\n")?;

        let first = install_to(rc_file, &block("echo hi"));
        let once = read_to_string(rc_file)?;
        let second = install_to(rc_file, &block("echo hi"));
        let twice = read_to_string(rc_file)?;

        assert!(matches!(first, InstallOutcome::Installed { .. }));
        assert!(matches!(second, InstallOutcome::Replaced { .. }));
        assert_eq!(twice, once);

        Ok(())
    }

    #[sealed_test]
    fn install_to_directory_fails_softly() -> anyhow::Result<()> {
        create_dir("rcdir")?;
        let outcome = install_to(Path::new("rcdir"), &block("echo hi"));

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            InstallOutcome::Failed {
                error: PatchError::ReadRcFile { .. },
                ..
            }
        ));

        Ok(())
    }

    #[sealed_test]
    fn remove_from_missing_file() -> anyhow::Result<()> {
        let result = remove_from(Path::new(".zshrc"), &block("echo hi"))?;
        assert_eq!(result, RemoveOutcome::NotFound);
        assert!(!Path::new(".zshrc").exists());

        Ok(())
    }

    #[sealed_test]
    fn remove_from_file_without_markers_leaves_it_alone() -> anyhow::Result<()> {
        let rc_file = Path::new(".zshrc");
        let content = "export FOO=1\n\n\n# not ours\n";
        write(rc_file, content)?;

        let result = remove_from(rc_file, &block("echo hi"))?;
        assert_eq!(result, RemoveOutcome::NotFound);
        assert_eq!(read_to_string(rc_file)?, content);

        Ok(())
    }

    #[sealed_test]
    fn remove_from_keeps_surroundings() -> anyhow::Result<()> {
        let rc_file = Path::new(".bashrc");
        write(
            rc_file,
            indoc! {r#"
                export FOO=1

                # BEGIN
                echo hi
                # END

                alias ll='ls -l'
            "#},
        )?;

        let result = remove_from(rc_file, &block("echo hi"))?;
        let expect = indoc! {r#"
            export FOO=1
            alias ll='ls -l'
        "#};
        assert_eq!(result, RemoveOutcome::Removed);
        assert_eq!(read_to_string(rc_file)?, expect);
        assert!(!is_installed_in(rc_file, &block("echo hi"))?);

        Ok(())
    }
}
