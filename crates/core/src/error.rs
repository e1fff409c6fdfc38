// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tix-core operations.

use thiserror::Error;

/// All possible errors that can occur in tix-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ticket not found for channel {0}")]
    TicketNotFound(String),

    #[error("ticket for channel {0} is not open")]
    TicketNotOpen(String),

    #[error("ticket for channel {0} is already closed")]
    AlreadyClosed(String),

    #[error("user {opener_id} already has an open ticket in channel {channel_id}")]
    AlreadyOpen {
        opener_id: String,
        channel_id: String,
    },

    #[error("a ticket already exists for channel {0}")]
    DuplicateChannel(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: open, closed")]
    InvalidStatus(String),

    #[error("invalid id: '{0}'")]
    InvalidId(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for tix-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
