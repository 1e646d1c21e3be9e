use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::process::{ExitCode, ExitStatus, Stdio};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::error::{LaunchError, LaunchResult};

/// Exit code reported by a static file server once it stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerExit {
    code: u8,
}

impl ServerExit {
    pub const SUCCESS: Self = Self { code: 0 };

    pub fn from_code(code: u8) -> Self {
        Self { code }
    }

    /// Map a child process status onto a single byte exit code.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::from_code(u8::try_from(code).unwrap_or(1));
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::from_code(u8::try_from(128 + signal).unwrap_or(1));
            }
        }

        Self::from_code(1)
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl From<ServerExit> for ExitCode {
    fn from(exit: ServerExit) -> Self {
        ExitCode::from(exit.code)
    }
}

/// Something that serves a directory over plain HTTP on a port until it is
/// terminated
pub trait StaticServer {
    fn serve(&self, dir: &Path, port: u16) -> impl Future<Output = LaunchResult<ServerExit>>;
}

#[cfg(windows)]
const DEFAULT_PROGRAM: &str = "npx.cmd";
#[cfg(not(windows))]
const DEFAULT_PROGRAM: &str = "npx";

/// Delegates to an external static file server process.
///
/// The process is run as `<program> [args...] <dir> -p <port>` with the
/// launcher's stdin, stdout and stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalServer {
    program: OsString,
    args: Vec<OsString>,
}

impl Default for ExternalServer {
    /// `npx http-server`
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, ["http-server"])
    }
}

impl ExternalServer {
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a command line split into words, the first being the
    /// program.
    pub fn from_words<I, S>(words: I) -> LaunchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut words = words.into_iter().map(Into::into);
        let program = words.next().ok_or(LaunchError::EmptyCommand)?;
        if program.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Full argument list passed to the program for `dir` and `port`
    pub fn arguments(&self, dir: &Path, port: u16) -> Vec<OsString> {
        let mut args = self.args.clone();
        args.push(dir.as_os_str().to_owned());
        args.push("-p".into());
        args.push(port.to_string().into());
        args
    }

    fn command(&self, dir: &Path, port: u16) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(self.arguments(dir, port))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

impl StaticServer for ExternalServer {
    async fn serve(&self, dir: &Path, port: u16) -> LaunchResult<ServerExit> {
        let program = self.program.to_string_lossy().into_owned();
        tracing::info!(
            program = %program,
            args = ?self.arguments(dir, port),
            "Starting external static file server"
        );

        let status = self
            .command(dir, port)
            .status()
            .await
            .map_err(|source| LaunchError::Spawn { program, source })?;

        let exit = ServerExit::from_status(status);
        if !exit.is_success() {
            tracing::warn!(code = exit.code(), "Static file server exited with failure");
        }
        Ok(exit)
    }
}

/// Serves the directory in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedServer {
    host: IpAddr,
}

impl Default for EmbeddedServer {
    /// Listen on all IPv4 interfaces
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl EmbeddedServer {
    pub fn new(host: IpAddr) -> Self {
        Self { host }
    }

    pub async fn bind(&self, port: u16) -> LaunchResult<TcpListener> {
        TcpListener::bind(SocketAddr::new(self.host, port))
            .await
            .map_err(|source| LaunchError::Bind { port, source })
    }

    /// Serve `dir` on an already bound listener until the server stops.
    pub async fn serve_on(&self, listener: TcpListener, dir: &Path) -> LaunchResult<ServerExit> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Serving {} at http://{addr}", dir.display());
        }
        axum::serve(listener, router(dir))
            .await
            .map_err(LaunchError::Serve)?;
        Ok(ServerExit::SUCCESS)
    }
}

impl StaticServer for EmbeddedServer {
    async fn serve(&self, dir: &Path, port: u16) -> LaunchResult<ServerExit> {
        let listener = self.bind(port).await?;
        self.serve_on(listener, dir).await
    }
}

/// Router answering every request from files under `dir`
pub fn router(dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(dir))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    fn os(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn default_external_server_is_npx_http_server() {
        let server = ExternalServer::default();
        assert_eq!(server.program(), OsStr::new(DEFAULT_PROGRAM));
        assert_eq!(
            server.arguments(Path::new("."), 80),
            os(&["http-server", ".", "-p", "80"])
        );
    }

    #[test]
    fn arguments_append_directory_and_port() {
        let server = ExternalServer::new("serve-static", ["--silent"]);
        assert_eq!(
            server.arguments(Path::new("/srv/app/dist"), 3000),
            os(&["--silent", "/srv/app/dist", "-p", "3000"])
        );
    }

    #[test]
    fn from_words_splits_program_and_args() {
        let server = ExternalServer::from_words(["npx", "http-server", "-c-1"]).unwrap();
        assert_eq!(server, ExternalServer::new("npx", ["http-server", "-c-1"]));
    }

    #[test]
    fn from_words_rejects_empty_command() {
        assert!(matches!(
            ExternalServer::from_words(Vec::<String>::new()),
            Err(LaunchError::EmptyCommand)
        ));
        assert!(matches!(
            ExternalServer::from_words([""]),
            Err(LaunchError::EmptyCommand)
        ));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let server = ExternalServer::new("distserve-no-such-server-binary", Vec::<String>::new());
        match server.serve(Path::new("."), 8080).await {
            Err(LaunchError::Spawn { program, .. }) => {
                assert_eq!(program, "distserve-no-such-server-binary");
            }
            other => panic!("Expected Spawn error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_exit_code_is_mirrored() {
        let server = ExternalServer::new("sh", ["-c", "exit 7"]);
        let exit = server.serve(Path::new("."), 80).await.unwrap();
        assert_eq!(exit.code(), 7);
        assert!(!exit.is_success());

        let server = ExternalServer::new("sh", ["-c", "exit 0"]);
        assert_eq!(server.serve(Path::new("."), 80).await.unwrap(), ServerExit::SUCCESS);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_killed_by_signal_maps_to_128_plus_signal() {
        let server = ExternalServer::new("sh", ["-c", "kill -9 $$"]);
        let exit = server.serve(Path::new("."), 80).await.unwrap();
        assert_eq!(exit.code(), 137);
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn embedded_server_serves_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>dist build</h1>").unwrap();
        fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();

        let server = EmbeddedServer::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let listener = server.bind(0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let root: PathBuf = dir.path().to_path_buf();
        let handle = tokio::spawn(async move { server.serve_on(listener, &root).await });

        let index = get(addr, "/").await;
        assert!(index.starts_with("HTTP/1.1 200"), "unexpected response: {index}");
        assert!(index.contains("<h1>dist build</h1>"));

        let script = get(addr, "/app.js").await;
        assert!(script.starts_with("HTTP/1.1 200"));
        assert!(script.contains("console.log('hi');"));

        let missing = get(addr, "/nope.css").await;
        assert!(missing.starts_with("HTTP/1.1 404"));

        handle.abort();
    }

    #[tokio::test]
    async fn embedded_server_reports_bind_failure() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = EmbeddedServer::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        match server.serve(Path::new("."), port).await {
            Err(LaunchError::Bind { port: failed, .. }) => assert_eq!(failed, port),
            other => panic!("Expected Bind error, got {other:?}"),
        }
    }
}
