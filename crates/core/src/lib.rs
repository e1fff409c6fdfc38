// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tix-core: Shared library for the tix ticket bot
//!
//! This crate provides the ticket record, its SQLite store, and the HTML
//! transcript renderer used when a ticket is closed.

pub mod db;
pub mod error;
pub mod ticket;
pub mod transcript;

pub use db::Database;
pub use error::{Error, Result};
pub use ticket::{Id, NewTicket, Status, Ticket};
pub use transcript::{
    AttachmentKind, AttachmentRef, InlineAttachment, TranscriptEmbed, TranscriptHeader,
    TranscriptMessage,
};
