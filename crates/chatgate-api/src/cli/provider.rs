//! Provider CLI commands: check.
//!
//! `chatgate provider check` sends a minimal completion through the
//! configured provider and reports whether it answered.

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use console::style;

use chatgate_infra::llm::test_provider_connection;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ProviderCommand {
    /// Send a short test prompt to the configured provider.
    Check,
}

/// Handle a provider subcommand.
pub async fn handle_provider_command(
    cmd: ProviderCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ProviderCommand::Check => check_provider(state, json).await,
    }
}

async fn check_provider(state: &AppState, json: bool) -> Result<()> {
    let settings = &state.config.provider;

    if !json {
        print!(
            "  Testing connection to {} ({})... ",
            style(state.provider.name()).cyan(),
            settings.model
        );
        let _ = std::io::stdout().flush();
    }

    let result = test_provider_connection(&state.provider).await;

    if json {
        let body = match &result {
            Ok(()) => serde_json::json!({
                "provider": state.provider.name(),
                "model": settings.model,
                "connected": true,
            }),
            Err(e) => serde_json::json!({
                "provider": state.provider.name(),
                "model": settings.model,
                "connected": false,
                "message": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match result {
        Ok(()) => println!("{}", style("connected").green().bold()),
        Err(e) => {
            println!("{}", style("FAILED").red().bold());
            eprintln!("  {} Connection test failed: {}", style("!").red().bold(), e);
            anyhow::bail!("provider check failed");
        }
    }

    Ok(())
}
