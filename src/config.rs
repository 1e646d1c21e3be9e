//! Launch configuration
//!
//! Everything the launcher needs is gathered once into a [`LaunchConfig`]
//! at startup. The process environment is only read by
//! [`LaunchConfig::from_env`], so tests can go through
//! [`LaunchConfig::from_lookup`] instead.

use std::path::{Path, PathBuf};

use crate::error::{LaunchError, LaunchResult};

/// Environment variable holding the port to serve on
pub const PORT_VAR: &str = "PORT";

/// Port used when `PORT` is unset or empty
pub const DEFAULT_PORT: u16 = 80;

/// Name of the build output directory under the project root
pub const DIST_DIR: &str = "dist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Port handed to the static file server
    pub port: u16,
    /// Directory expected to contain [`DIST_DIR`]
    pub project_root: PathBuf,
}

impl LaunchConfig {
    pub fn new(port: u16, project_root: impl Into<PathBuf>) -> Self {
        Self {
            port,
            project_root: project_root.into(),
        }
    }

    /// Build a config from the process environment.
    pub fn from_env(project_root: impl Into<PathBuf>) -> LaunchResult<Self> {
        Self::from_lookup(project_root, |key| {
            std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Build a config with `lookup` standing in for the environment.
    pub fn from_lookup<F>(project_root: impl Into<PathBuf>, lookup: F) -> LaunchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(lookup(PORT_VAR).as_deref())?;
        Ok(Self::new(port, project_root))
    }

    /// The candidate build output directory
    pub fn dist_dir(&self) -> PathBuf {
        self.project_root.join(DIST_DIR)
    }
}

/// Parse a raw port value, falling back to [`DEFAULT_PORT`] when it is
/// missing or blank.
pub fn parse_port(raw: Option<&str>) -> LaunchResult<u16> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse()
            .map_err(|_| LaunchError::InvalidPort(value.to_string())),
    }
}

/// Project root derived from where the running executable lives: the parent
/// of the directory holding it.
pub fn project_root_from_exe() -> LaunchResult<PathBuf> {
    let exe = std::env::current_exe().map_err(LaunchError::ProgramLocation)?;
    let launcher_dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(project_root_for(launcher_dir))
}

/// `<launcher_dir>/..`, resolved lexically where possible.
pub fn project_root_for(launcher_dir: &Path) -> PathBuf {
    match launcher_dir.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => launcher_dir.join(".."),
    }
}
