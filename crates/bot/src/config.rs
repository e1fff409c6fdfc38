// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bot configuration.
//!
//! Configuration is stored in a TOML file (default `tix.toml`) and includes:
//! - the guild, staff roles and the channels the bot posts into
//! - the dropdown options, each mapped to a ticket category
//! - presence rotation and branding for embeds
//!
//! The bot token is read from `DISCORD_TOKEN` (a `.env` file is honoured)
//! and only falls back to the `token` key in the file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tix_core::Id;

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "tix.toml";
/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";
const DB_FILE_NAME: &str = "tickets.db";
const STATE_DIR_NAME: &str = "tix";

/// Bot configuration loaded from `tix.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bot token. Prefer the environment; this is a fallback.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// The guild the bot serves.
    pub guild_id: Id,
    /// Roles allowed to close and manage tickets. They can see every ticket.
    pub staff_role_ids: Vec<Id>,
    /// Roles allowed to post the setup menu. Empty means staff roles.
    #[serde(default)]
    pub setup_role_ids: Vec<Id>,
    /// Channel that receives the setup menu.
    pub setup_channel_id: Id,
    /// Channel that receives closed-ticket transcripts.
    pub transcript_channel_id: Id,
    /// Database file. Defaults to the user state directory.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Seconds between the close announcement and channel deletion.
    #[serde(default = "default_close_delay_secs")]
    pub close_delay_secs: u64,
    /// Dropdown options; their category ids are the ticket categories.
    pub categories: Vec<CategoryOption>,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub branding: Branding,
    /// Maximum gateway reconnection attempts before giving up.
    #[serde(default = "default_reconnect_max_retries")]
    pub reconnect_max_retries: u32,
    /// Maximum delay between reconnection attempts in seconds.
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
}

/// One entry of the "open a ticket" dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    /// Dropdown value, unique among options.
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    /// Channel category new tickets of this kind are created in.
    pub category_id: Id,
}

/// Rotating "playing ..." status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default = "default_presence_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        PresenceConfig {
            activities: Vec::new(),
            interval_secs: default_presence_interval_secs(),
        }
    }
}

/// Name and avatar shown in embed footers and thumbnails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default = "default_brand_name")]
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Branding {
            name: default_brand_name(),
            avatar_url: None,
        }
    }
}

fn default_close_delay_secs() -> u64 {
    5
}

fn default_presence_interval_secs() -> u64 {
    60
}

fn default_brand_name() -> String {
    "Ticket Bot".to_string()
}

fn default_reconnect_max_retries() -> u32 {
    10
}

fn default_reconnect_max_delay_secs() -> u64 {
    30
}

impl Config {
    /// Parses a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Loads configuration from the given file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `.env` (from `env_file` if given) and takes the token from the
    /// environment when set.
    pub fn load_token_from_env(&mut self, env_file: Option<&Path>) -> Result<()> {
        let loaded = match env_file {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => dotenvy::dotenv().map(|_| ()),
        };
        if let Err(e) = loaded {
            if env_file.is_some() || !e.not_found() {
                return Err(Error::Config(format!("failed to load env file: {e}")));
            }
        }
        self.apply_token(std::env::var(TOKEN_ENV).ok());
        Ok(())
    }

    /// A non-empty environment token wins over the file.
    pub fn apply_token(&mut self, env_token: Option<String>) {
        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
    }

    /// Returns the bot token, or [`Error::MissingToken`].
    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)
    }

    /// Checks the invariants the handlers rely on.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::Config(
                "at least one [[categories]] entry is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for option in &self.categories {
            if option.value.trim().is_empty() {
                return Err(Error::Config("category value cannot be empty".to_string()));
            }
            if !seen.insert(option.value.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate category value '{}'",
                    option.value
                )));
            }
        }
        if self.categories.len() > 25 {
            return Err(Error::Config(
                "a dropdown holds at most 25 categories".to_string(),
            ));
        }
        if self.staff_role_ids.is_empty() {
            return Err(Error::Config(
                "staff_role_ids must list at least one role".to_string(),
            ));
        }
        if self.presence.interval_secs == 0 && !self.presence.activities.is_empty() {
            return Err(Error::Config(
                "presence.interval_secs must be greater than zero".to_string(),
            ));
        }
        self.token()?;
        Ok(())
    }

    /// Finds the dropdown option with the given value.
    pub fn category(&self, value: &str) -> Option<&CategoryOption> {
        self.categories.iter().find(|c| c.value == value)
    }

    /// Finds the dropdown option that maps to a channel category.
    pub fn category_by_id(&self, category_id: Id) -> Option<&CategoryOption> {
        self.categories.iter().find(|c| c.category_id == category_id)
    }

    /// True if the channel category holds tickets.
    pub fn is_ticket_category(&self, category_id: Option<Id>) -> bool {
        category_id.is_some_and(|id| self.category_by_id(id).is_some())
    }

    /// True if any of the roles is a staff role.
    pub fn is_staff(&self, roles: &[Id]) -> bool {
        roles.iter().any(|r| self.staff_role_ids.contains(r))
    }

    /// True if the roles may post the setup menu.
    pub fn can_setup(&self, roles: &[Id]) -> bool {
        if self.setup_role_ids.is_empty() {
            return self.is_staff(roles);
        }
        roles.iter().any(|r| self.setup_role_ids.contains(r))
    }

    /// Resolved database path.
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => default_state_dir().join(DB_FILE_NAME),
        }
    }
}

/// Directory for bot state when no database path is configured.
pub fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(STATE_DIR_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
