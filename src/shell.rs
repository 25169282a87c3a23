// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell configuration file candidates.
//!
//! Figure out which shell configuration files are plausible places to put the
//! cdj hook for the current user. Nothing here touches the file system. The
//! candidates are computed purely from the user's preferred shell indicator,
//! e.g., `$SHELL`, and their home directory.
//!
//! # Candidate Order
//!
//! Installation is first-match-wins, so order matters. Files belonging to the
//! preferred shell come first, followed by a fixed fallback trio of
//! `~/.zshrc`, `~/.bashrc`, and `~/.bash_profile`. Removal does not care
//! about order, and simply scans that fixed trio in full.

use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Shell family named by a shell indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Zsh,
    Bash,
    Fish,
}

impl Shell {
    /// Detect shell family from indicator like `/usr/bin/zsh`.
    ///
    /// Matches by substring, so full paths to a shell binary work. Returns
    /// `None` for empty or unrecognized indicators.
    pub fn detect(indicator: impl AsRef<str>) -> Option<Self> {
        let indicator = indicator.as_ref();
        if indicator.contains("zsh") {
            Some(Self::Zsh)
        } else if indicator.contains("bash") {
            Some(Self::Bash)
        } else if indicator.contains("fish") {
            Some(Self::Fish)
        } else {
            None
        }
    }

    /// Configuration files of shell relative to home directory.
    ///
    /// Bash gets two entries, because macOS login shells read
    /// `~/.bash_profile` instead of `~/.bashrc`. The fish entry is not a fish
    /// script, but listing it shows the user where to adapt the hook.
    pub fn rc_files(&self, home: &Path) -> Vec<PathBuf> {
        match self {
            Self::Zsh => vec![home.join(".zshrc")],
            Self::Bash => vec![home.join(".bashrc"), home.join(".bash_profile")],
            Self::Fish => vec![home.join(".config").join("fish").join("config.fish")],
        }
    }
}

impl Display for Shell {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Zsh => fmt.write_str("zsh"),
            Self::Bash => fmt.write_str("bash"),
            Self::Fish => fmt.write_str("fish"),
        }
    }
}

/// Fixed listing of well-known shell configuration files.
pub fn default_rc_files(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join(".zshrc"),
        home.join(".bashrc"),
        home.join(".bash_profile"),
    ]
}

/// Ordered candidate files to try installing the hook into.
///
/// Never empty. Duplicates are dropped while keeping first-seen order.
pub fn candidate_rc_files(indicator: impl AsRef<str>, home: &Path) -> Vec<PathBuf> {
    let mut preferred = Shell::detect(indicator)
        .map(|shell| shell.rc_files(home))
        .unwrap_or_default();
    preferred.extend(default_rc_files(home));

    let mut seen = HashSet::new();
    preferred.retain(|path| seen.insert(path.clone()));
    preferred
}
