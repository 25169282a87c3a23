// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hook configuration.
//!
//! Two sources of configuration feed the installer: the process environment
//! captured into a [`HookEnv`], and an optional settings file deserialized
//! into [`HookSettings`]. Both are plain values that get passed around
//! explicitly. Nothing below the command line front end reads the process
//! environment on its own, which keeps patching logic testable without
//! touching real environment variables.

use crate::path::{home_dir, NoWayHome};

use serde::{Deserialize, Serialize};
use std::{
    env::{var, var_os},
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Snapshot of environment signals relevant to hook installation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookEnv {
    /// Preferred shell indicator, usually `$SHELL`. Empty if unset.
    pub shell: String,

    /// User's home directory.
    pub home: PathBuf,

    /// Package manager was told to skip lifecycle scripts.
    pub ignore_scripts: bool,

    /// Running under continuous integration.
    pub ci: bool,
}

impl HookEnv {
    /// Construct new environment snapshot for given home directory.
    ///
    /// No shell indicator is set, and no opt-out signals are raised.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Default::default()
        }
    }

    /// Capture environment snapshot from current process.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory cannot be determined.
    pub fn from_env() -> Result<Self, NoWayHome> {
        let env = Self {
            shell: var("SHELL").unwrap_or_default(),
            home: home_dir()?,
            ignore_scripts: var("npm_config_ignore_scripts").is_ok_and(|value| value == "true"),
            ci: var_os("CI").is_some_and(|value| !value.is_empty()),
        };
        debug!("captured hook environment: {env:?}");

        Ok(env)
    }
}

/// Hook settings file layout.
///
/// # General Layout
///
/// ```toml
/// [settings]
/// rc_file = "$HOME/.config/zsh/.zshrc"
/// skip = false
/// ```
///
/// Every field is optional. An absent file is the same as an empty one.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct HookSettings {
    /// Settings for the hook installer.
    #[serde(default)]
    pub settings: InstallSettings,
}

impl HookSettings {
    /// Load hook settings from file.
    ///
    /// Missing file yields default settings.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadSettings`] if file exists but cannot be
    ///   read.
    /// - Return [`ConfigError::Deserialize`] if file holds invalid TOML.
    /// - Return [`ConfigError::ShellExpansion`] if `rc_file` cannot be
    ///   expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no hook settings at {:?}", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::ReadSettings {
                source: err,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for HookSettings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: HookSettings = toml::de::from_str(data)?;

        // INVARIANT: Perform shell expansion on preferred rc file field.
        if let Some(rc_file) = settings.settings.rc_file.take() {
            let expanded = shellexpand::full(rc_file.to_string_lossy().as_ref())?.into_owned();
            settings.settings.rc_file = Some(PathBuf::from(expanded));
        }

        Ok(settings)
    }
}

impl Display for HookSettings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Hook installer settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct InstallSettings {
    /// Shell configuration file to try before any detected candidate.
    pub rc_file: Option<PathBuf>,

    /// Never install the hook automatically.
    #[serde(default)]
    pub skip: bool,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file exists but cannot be read.
    #[error("failed to read hook settings at {:?}", path.display())]
    ReadSettings {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
