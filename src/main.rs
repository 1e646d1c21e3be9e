use std::process::ExitCode;

use clap::Parser;

use distserve::cli::Cli;
use distserve::launcher;
use distserve::logging;
use distserve::server::EmbeddedServer;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();
    let config = cli.config()?;
    let mut stdout = std::io::stdout();

    let exit = if cli.embedded {
        launcher::launch(&config, &EmbeddedServer::default(), &mut stdout).await?
    } else {
        let server = cli.external_server()?;
        launcher::launch(&config, &server, &mut stdout).await?
    };

    Ok(exit.into())
}
