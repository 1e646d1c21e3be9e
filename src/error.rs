//! Launcher errors

use thiserror::Error;

/// Errors that can stop the launcher before or while serving
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The configured port is not an integer in `0..=65535`
    #[error("invalid port `{0}`: expected an integer between 0 and 65535")]
    InvalidPort(String),

    /// The launcher's own executable could not be located
    #[error("could not locate the launcher executable: {0}")]
    ProgramLocation(#[source] std::io::Error),

    /// The external server command has no program to run
    #[error("static file server command is empty")]
    EmptyCommand,

    /// The external server process could not be started
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The embedded server could not bind its port
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The embedded server stopped with an error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for launcher operations
pub type LaunchResult<T> = Result<T, LaunchError>;
