use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use nicbind::Error;
use nicbind_config::NicBindConfig;
use nicbind_sys::SysPaths;
use tracing_subscriber::EnvFilter;

/// Bind NIC queue interrupts and RPS masks to CPUs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the config toml file
    config: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Usage errors are reported but don't change the exit code.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let config = match NicBindConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(config = %args.config.display(), %e, "failed to load config");
            return ExitCode::SUCCESS;
        }
    };

    match nicbind::run(&SysPaths::default(), &config) {
        Ok(report) => {
            tracing::info!(irqs = report.irqs, queues = report.queues, "done");
            ExitCode::SUCCESS
        }
        Err(Error::Config(e)) => {
            tracing::error!(%e, "invalid config, nothing was bound");
            ExitCode::SUCCESS
        }
        Err(e @ Error::Sys(_)) => {
            tracing::error!(%e, "aborting");
            ExitCode::FAILURE
        }
    }
}
