//! Command implementations for the TAF processor CLI
//!
//! Each subcommand lives in its own module:
//! - `process`: ingest bulletin files into the chunk store
//! - `decode`: decode messages and print them as JSON
//!
//! `shared` holds the logging setup, configuration loading and reporting
//! both commands use.

pub mod decode;
pub mod process;
pub mod shared;

pub use shared::{ProcessingStats, setup_logging};

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner
pub fn run(args: Args) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => process::run_process(process_args),
        Some(Commands::Decode(decode_args)) => decode::run_decode(decode_args),
        None => Err(Error::configuration("No command given")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_an_error() {
        assert!(run(Args { command: None }).is_err());
    }

    #[test]
    fn test_processing_stats_re_export() {
        let stats = ProcessingStats::default();
        assert_eq!(stats.files_found, 0);
        assert!(!stats.all_files_failed());
    }
}
