use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    coverfetch::logging::init().context("init logging")?;

    let cli = coverfetch::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        coverfetch::cli::Command::Fetch(args) => {
            coverfetch::fetch::run(args).await.context("fetch")?;
        }
        coverfetch::cli::Command::Status(args) => {
            coverfetch::status::run(args).context("status")?;
        }
        coverfetch::cli::Command::Export(args) => {
            coverfetch::export::run(args).context("export")?;
        }
    }

    Ok(())
}
