// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use tix_core::Status;

use crate::config::CONFIG_FILE_NAME;

/// Ticket status filter for `tixd tickets`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Open,
    Closed,
}

impl From<StatusFilter> for Status {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Open => Status::Open,
            StatusFilter::Closed => Status::Closed,
        }
    }
}

const QUICKSTART_HELP: &str = "\
Get started:
  tixd init-db              Create the ticket database
  DISCORD_TOKEN=... tixd run
  tixd tickets --status open";

#[derive(Parser)]
#[command(name = "tixd")]
#[command(version)]
#[command(about = "A support ticket bot for a Discord guild")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Connect to Discord and handle tickets until interrupted
    Run {
        /// Read DISCORD_TOKEN from this file instead of ./.env
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// Create the ticket database if it does not exist
    InitDb,

    /// List tickets recorded in the database
    Tickets {
        /// Only show tickets with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
