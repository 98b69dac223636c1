//! ctrhash - Command-line interface for hashing CTR records.
//!
//! This binary hashes comma-separated click-through-rate records into labeled
//! sparse vectors and offers a per-record inspection mode. Logs go to stderr so
//! that vectors can be piped from stdout.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ctrhash_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("ctrhash=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash(cmd) => {
            let summary = cmd.run()?;
            info!(
                records = summary.records,
                vectors = summary.vectors,
                rejected = summary.rejected,
                "ctrhash hash completed"
            );
        }
        Commands::Inspect(cmd) => cmd.run()?,
    }

    Ok(())
}
