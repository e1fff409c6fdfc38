// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the tixd bot.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tix_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("no bot token configured\n  hint: set DISCORD_TOKEN or add `token` to the config file")]
    MissingToken,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("discord api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by discord (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<f64> },

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("malformed interaction: {0}")]
    Interaction(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

/// Result type alias using the tixd Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
