//! CLI module for the inline CRUD service
//!
//! - `serve`: run the HTTP server
//! - `check-config`: load and validate the configuration, then exit

pub mod check_config;
pub mod serve;

use clap::{Parser, Subcommand};

/// Edit authors together with their books in one submission
#[derive(Parser)]
#[command(name = "inline-crud")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Validate configuration and workflow setup without serving
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["inline-crud", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));

        let cli = Cli::try_parse_from(["inline-crud", "check-config"]).unwrap();
        assert!(matches!(cli.command, Command::CheckConfig));

        assert!(Cli::try_parse_from(["inline-crud", "ui"]).is_err());
    }
}
