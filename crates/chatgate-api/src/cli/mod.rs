//! CLI command definitions for the `chatgate` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod provider;
pub mod user;

use clap::{Parser, Subcommand};

/// Authenticated chat gateway in front of a hosted completion model.
#[derive(Parser)]
#[command(name = "chatgate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Database URL (defaults to `{data_dir}/chatgate.db`).
    #[arg(long, global = true, env = "CHATGATE_DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on.
        #[arg(long, short, default_value = "8000")]
        port: u16,
    },

    /// Provision and list users.
    User {
        #[command(subcommand)]
        action: user::UserCommand,
    },

    /// Inspect the completion provider.
    Provider {
        #[command(subcommand)]
        action: provider::ProviderCommand,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["chatgate", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_user_add_with_global_flags() {
        let cli =
            Cli::try_parse_from(["chatgate", "user", "add", "alice", "--password", "pw", "-vv", "--json"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        match cli.command {
            Commands::User {
                action: user::UserCommand::Add { username, password },
            } => {
                assert_eq!(username, "alice");
                assert_eq!(password.as_deref(), Some("pw"));
            }
            _ => panic!("expected user add"),
        }
    }
}
