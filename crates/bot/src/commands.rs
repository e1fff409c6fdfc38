// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The `tixd` subcommands.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use tix_core::{Database, Status, Ticket};

use crate::config::Config;
use crate::discord::{Gateway, GatewayConfig, RestClient};
use crate::error::Result;
use crate::handlers::TicketBot;

/// Connect to the gateway and serve tickets until Ctrl-C.
pub fn serve(config_path: &Path, env_file: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    config.load_token_from_env(env_file)?;
    config.validate()?;
    let token = config.token()?.to_string();

    let db_path = config.database_path();
    let db = Database::open(&db_path)?;
    info!(path = %db_path.display(), "database opened");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let mut gateway = Gateway::new(GatewayConfig::from_config(&config, &token));
        let bot = Arc::new(TicketBot::new(config, db, RestClient::new(&token)));
        tokio::select! {
            result = gateway.run(bot) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                Ok(())
            }
        }
    })
}

/// Create the database (and its directory) without connecting anywhere.
pub fn init_db(config_path: &Path, out: &mut impl Write) -> Result<()> {
    let config = Config::load(config_path)?;
    let path = config.database_path();
    Database::open(&path)?;
    writeln!(out, "Database ready at {}", path.display())?;
    Ok(())
}

/// Print tickets, newest first.
pub fn tickets(config_path: &Path, status: Option<Status>, out: &mut impl Write) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database_path())?;
    list_tickets(&db, status, out)
}

pub fn list_tickets(db: &Database, status: Option<Status>, out: &mut impl Write) -> Result<()> {
    let tickets = db.list_tickets(status)?;
    if tickets.is_empty() {
        writeln!(out, "No tickets")?;
        return Ok(());
    }
    for ticket in &tickets {
        writeln!(out, "{}", format_ticket(ticket))?;
    }
    let (open, closed) = db.count_by_status()?;
    writeln!(out, "\n{open} open, {closed} closed")?;
    Ok(())
}

/// One line per ticket: channel, status, name, category, opener, dates.
pub fn format_ticket(ticket: &Ticket) -> String {
    let mut line = format!(
        "{}  {:<6}  {}  [{}]  opened by {} on {}",
        ticket.channel_id,
        ticket.status.as_str(),
        ticket.channel_name,
        ticket.category_name,
        ticket.opener_name,
        ticket.opened_at.format("%Y-%m-%d %H:%M"),
    );
    if let (Some(closer), Some(closed_at)) = (&ticket.closer_name, ticket.closed_at) {
        line.push_str(&format!(
            ", closed by {} on {}",
            closer,
            closed_at.format("%Y-%m-%d %H:%M")
        ));
    }
    if let Some(reason) = &ticket.close_reason {
        line.push_str(&format!(" ({reason})"));
    }
    line
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
