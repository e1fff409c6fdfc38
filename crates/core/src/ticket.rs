// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core ticket types.
//!
//! A ticket is a chat channel opened by one user for one support request.
//! Its lifecycle is a single flag, [`Status`], that moves from open to
//! closed exactly once.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A platform snowflake identifier (users, channels, roles, messages).
///
/// Serialized as a decimal string, which is how the platform sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub u64);

impl Id {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Id)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake as a string or integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Id, E> {
                Ok(Id(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Id, E> {
                u64::try_from(v)
                    .map(Id)
                    .map_err(|_| E::custom(format!("negative snowflake {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Id, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The ticket channel exists and staff are handling it.
    Open,
    /// Closed by staff; the transcript has been archived. Terminal.
    Closed,
}

impl Status {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Closed => "closed",
        }
    }

    /// Only `open -> closed` is allowed; closing is irreversible.
    pub fn can_transition_to(&self, target: Status) -> bool {
        matches!((self, target), (Status::Open, Status::Closed))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "closed" => Ok(Status::Closed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Fields known when a ticket channel is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub channel_id: Id,
    pub channel_name: String,
    pub category_id: Id,
    pub category_name: String,
    pub opener_id: Id,
    pub opener_name: String,
}

/// One row of the ticket table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// The ticket channel; also the lookup key.
    pub channel_id: Id,
    pub channel_name: String,
    pub category_id: Id,
    pub category_name: String,
    /// The user who opened the ticket.
    pub opener_id: Id,
    pub opener_name: String,
    /// The staff member who closed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closer_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closer_name: Option<String>,
    pub opened_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
    pub status: Status,
}

impl Ticket {
    /// Builds an open ticket with no closer.
    pub fn open(new: NewTicket, opened_at: DateTime<Utc>) -> Self {
        Ticket {
            channel_id: new.channel_id,
            channel_name: new.channel_name,
            category_id: new.category_id,
            category_name: new.category_name,
            opener_id: new.opener_id,
            opener_name: new.opener_name,
            closer_id: None,
            closer_name: None,
            opened_at,
            closed_at: None,
            close_reason: None,
            status: Status::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
