//! User provisioning CLI commands: add, list.
//!
//! The HTTP surface never creates users; operators provision them here.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Password;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user. Prompts for the password when `--password` is omitted.
    Add {
        username: String,

        /// Plaintext password (prefer the hidden prompt outside of scripts).
        #[arg(long)]
        password: Option<String>,
    },

    /// List provisioned users.
    #[command(alias = "ls")]
    List,
}

/// Handle a user subcommand.
pub async fn handle_user_command(cmd: UserCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        UserCommand::Add { username, password } => add_user(state, &username, password, json).await,
        UserCommand::List => list_users(state, json).await,
    }
}

async fn add_user(
    state: &AppState,
    username: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt(format!("Password for {}", style(username).bold()))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let profile = state.user_service.create_user(username, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!(
            "  {} User '{}' created",
            style("✓").green().bold(),
            style(&profile.username).bold()
        );
    }

    Ok(())
}

async fn list_users(state: &AppState, json: bool) -> Result<()> {
    let users = state.user_service.list_users().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!(
            "  {} No users yet. Add one with: {}",
            style("i").blue().bold(),
            style("chatgate user add <username>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Username").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for user in &users {
        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(&user.username).fg(Color::Cyan),
            Cell::new(user.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
    Ok(())
}
