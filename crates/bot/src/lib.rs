// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tixd - the tix ticket bot.
//!
//! Connects to the Discord gateway, answers the ticket slash commands and
//! components, and keeps the ticket table in [`tix_core::Database`] in step
//! with the guild's channels.
//!
//! # Main Components
//!
//! - [`Config`] - Guild, roles, categories and presentation from `tix.toml`
//! - [`discord`] - REST client, gateway connection and wire types
//! - [`Platform`] - The seam handlers use to act on the guild
//! - [`TicketBot`] - Event and interaction handlers
//! - [`Error`] - Error types for all operations

mod cli;
mod commands;

pub mod config;
pub mod discord;
pub mod error;
pub mod handlers;
pub mod platform;

pub use cli::{Cli, Command, StatusFilter};
pub use config::Config;
pub use error::{Error, Result};
pub use handlers::TicketBot;
pub use platform::Platform;

/// Run one `tixd` subcommand.
pub fn run(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    match cli.command {
        Command::Run { env_file } => commands::serve(&cli.config, env_file.as_deref()),
        Command::InitDb => commands::init_db(&cli.config, &mut stdout),
        Command::Tickets { status } => {
            commands::tickets(&cli.config, status.map(Into::into), &mut stdout)
        }
    }
}
