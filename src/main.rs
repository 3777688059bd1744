use std::process::ExitCode;

use clap::Parser;
use kmsprobe::{
    config::{Cli, ProbeConfig},
    probe,
};
use tracing::info;

fn main() -> ExitCode {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    }

    let config = ProbeConfig::resolve(Cli::parse());
    info!(device = ?config.device, writes = config.writes.len(), "Starting probe");

    let stdout = std::io::stdout();
    match probe::run(&config, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
