//! ctrhash CLI Library
//!
//! This crate provides the command-line interface for ctrhash:
//!
//! - **Hash**: Hash a file (or stdin) of CTR records into LibSVM or JSON Lines
//! - **Inspect**: Show how a single record maps to buckets
//!
//! # Example
//!
//! ```bash
//! # Hash a CSV file into 2^20 buckets, skipping its header line
//! ctrhash hash --input train.csv --output train.svm --num-buckets 1048576 --skip-header
//!
//! # Read stdin, write JSON Lines to stdout
//! cat train.csv | ctrhash hash --num-buckets 4096 --format jsonl
//!
//! # See which bucket every feature of a record lands in
//! ctrhash inspect --num-buckets 4 "1.0,0,1,1,0"
//! ```

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::{FormatArg, HashCommand, InspectCommand};

/// ctrhash - feature hashing for click-through-rate data
///
/// Turns comma-separated CTR records into fixed-dimension labeled sparse
/// vectors using the hashing trick.
#[derive(Parser, Debug)]
#[command(name = "ctrhash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash a stream of records into sparse vectors
    Hash(HashCommand),

    /// Show the feature-to-bucket mapping of a single record
    Inspect(InspectCommand),
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash_command() {
        let cli = Cli::try_parse_from([
            "ctrhash",
            "hash",
            "--input",
            "train.csv",
            "--num-buckets",
            "1024",
            "--format",
            "jsonl",
            "--skip-header",
            "--fail-fast",
        ])
        .unwrap();

        match cli.command {
            Commands::Hash(cmd) => {
                assert_eq!(cmd.input.to_str(), Some("train.csv"));
                assert_eq!(cmd.output.to_str(), Some("-"));
                assert_eq!(cmd.num_buckets, Some(1024));
                assert_eq!(cmd.format, FormatArg::Jsonl);
                assert!(cmd.skip_header);
                assert!(cmd.fail_fast);
                assert!(!cmd.print_mapping);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_inspect_command() {
        let cli = Cli::try_parse_from(["ctrhash", "inspect", "-n", "4", "1.0,0,1,1,0"]).unwrap();
        match cli.command {
            Commands::Inspect(cmd) => {
                assert_eq!(cmd.num_buckets, 4);
                assert_eq!(cmd.record, "1.0,0,1,1,0");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result = Cli::try_parse_from(["ctrhash", "hash", "-n", "8", "--format", "parquet"]);
        assert!(result.is_err());
    }
}
