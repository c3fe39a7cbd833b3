use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    tululu_catalog::logging::init().context("init logging")?;

    let cli = tululu_catalog::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        tululu_catalog::cli::Command::Ids(args) => {
            tululu_catalog::catalog::run(args).context("ids")?;
        }
        tululu_catalog::cli::Command::Category(args) => {
            tululu_catalog::category::run(args).context("category")?;
        }
    }

    Ok(())
}
