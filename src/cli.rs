use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, LaunchConfig};
use crate::error::LaunchResult;
use crate::server::ExternalServer;

/// Serve a project's `dist` build output, or the project root when there is none.
#[derive(Parser, Debug)]
#[command(name = "distserve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to serve on [default: $PORT, then 80]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory containing `dist` [default: parent of the executable's directory]
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Serve files in-process instead of running an external server
    #[arg(long, conflicts_with = "server_cmd")]
    pub embedded: bool,

    /// External server command; `<DIR> -p <PORT>` is appended [default: npx http-server]
    #[arg(last = true, value_name = "CMD")]
    pub server_cmd: Vec<String>,
}

impl Cli {
    /// Assemble the launch config, reading `PORT` unless `--port` was given.
    pub fn config(&self) -> LaunchResult<LaunchConfig> {
        let project_root = match &self.project_root {
            Some(root) => root.clone(),
            None => config::project_root_from_exe()?,
        };
        match self.port {
            Some(port) => Ok(LaunchConfig::new(port, project_root)),
            None => LaunchConfig::from_env(project_root),
        }
    }

    pub fn external_server(&self) -> LaunchResult<ExternalServer> {
        if self.server_cmd.is_empty() {
            Ok(ExternalServer::default())
        } else {
            ExternalServer::from_words(&self.server_cmd)
        }
    }
}
