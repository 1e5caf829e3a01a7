//! Client CLI implementation.
//!
//! Command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Log output format for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for lmsh_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => lmsh_core::LogFormat::Text,
            CliLogFormat::Json => lmsh_core::LogFormat::Json,
        }
    }
}

/// Terminal client for the library session host.
#[derive(Debug, Parser)]
#[command(name = "lmsh", version, about)]
pub struct Cli {
    /// WebSocket URL of the session host.
    #[arg(long, default_value = "ws://127.0.0.1:8080/terminal")]
    pub url: String,

    /// Run the built-in simulated session without contacting a host.
    #[arg(long)]
    pub local: bool,

    /// Increase verbosity (repeat for more detail).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t)]
    pub log_format: CliLogFormat,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["lmsh"]);
        assert_eq!(cli.url, "ws://127.0.0.1:8080/terminal");
        assert!(!cli.local);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, CliLogFormat::Text);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn verbosity_accumulates() {
        let cli = Cli::parse_from(["lmsh", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn local_mode_and_url() {
        let cli = Cli::parse_from(["lmsh", "--local", "--url", "ws://host:9000/term"]);
        assert!(cli.local);
        assert_eq!(cli.url, "ws://host:9000/term");
    }

    #[test]
    fn log_format_parses() {
        let cli = Cli::parse_from(["lmsh", "--log-format", "json"]);
        assert_eq!(cli.log_format, CliLogFormat::Json);
        assert_eq!(
            lmsh_core::LogFormat::from(cli.log_format),
            lmsh_core::LogFormat::Json
        );
    }
}
