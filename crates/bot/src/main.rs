// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tixd - The tix ticket bot.
//!
//! Usage:
//!   tixd [--config tix.toml] run [--env-file .env]
//!   tixd init-db
//!   tixd tickets [--status open|closed]

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;
use std::path::Path;

use clap::Parser;
use tixd::{Cli, Command};

/// Log file, relative to the working directory.
const LOG_PATH: &str = "logs/tixd.log";

fn main() {
    let cli = Cli::parse();

    // Listing commands print to stdout; only the bot itself logs
    if matches!(cli.command, Command::Run { .. }) {
        setup_logging(Path::new(LOG_PATH));
        tracing::info!("tixd {} starting", env!("CARGO_PKG_VERSION"));
    }

    if let Err(e) = tixd::run(cli) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(dir) = log_path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
