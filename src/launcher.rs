//! Directory selection and hand-off to the static file server

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LaunchConfig;
use crate::error::LaunchResult;
use crate::server::{ServerExit, StaticServer};

/// Which directory ended up being served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    /// The project's `dist` build output
    Dist,
    /// The current working directory, used when there is no `dist`
    ProjectRoot,
}

/// The resolved decision: what to serve and on which port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub source: ServeSource,
    pub target: PathBuf,
    pub port: u16,
}

impl LaunchPlan {
    pub fn resolve(config: &LaunchConfig) -> Self {
        let dist = config.dist_dir();
        let (source, target) = if is_directory(&dist) {
            (ServeSource::Dist, dist)
        } else {
            (ServeSource::ProjectRoot, PathBuf::from("."))
        };
        Self {
            source,
            target,
            port: config.port,
        }
    }

    /// The line printed before the server starts
    pub fn status_line(&self) -> String {
        match self.source {
            ServeSource::Dist => format!("Serving ./dist on port {}", self.port),
            ServeSource::ProjectRoot => {
                format!("./dist not found, serving project root on port {}", self.port)
            }
        }
    }
}

/// Whether `path` exists and is a directory. A path whose metadata cannot be
/// read counts as absent.
pub fn is_directory(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_dir(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Build output not readable");
            false
        }
    }
}

/// Resolve the plan, write its status line to `out`, then serve until the
/// server exits.
pub async fn launch<S, W>(config: &LaunchConfig, server: &S, out: &mut W) -> LaunchResult<ServerExit>
where
    S: StaticServer,
    W: Write,
{
    let plan = LaunchPlan::resolve(config);
    tracing::info!(
        source = ?plan.source,
        target = %plan.target.display(),
        port = plan.port,
        "Resolved serve directory"
    );

    writeln!(out, "{}", plan.status_line())?;
    out.flush()?;

    server.serve(&plan.target, plan.port).await
}
