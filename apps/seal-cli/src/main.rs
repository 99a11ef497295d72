//! Seal CLI binary

use clap::Parser;
use seal_cli::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("seal-cli v{}", env!("CARGO_PKG_VERSION"));

    let output = seal_cli::run(&cli)?;
    println!("{}", output);
    Ok(())
}
