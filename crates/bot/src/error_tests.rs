// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    config = { Error::Config("bad toml".into()), "bad toml" },
    missing_token = { Error::MissingToken, "DISCORD_TOKEN" },
    api = { Error::Api { status: 403, message: "Missing Access".into() }, "403" },
    gateway = { Error::Gateway("closed with 4004".into()), "4004" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn core_errors_pass_through() {
    let err: Error = tix_core::Error::AlreadyClosed("10".into()).into();
    assert!(matches!(err, Error::Core(tix_core::Error::AlreadyClosed(_))));
    assert_eq!(err.to_string(), "ticket for channel 10 is already closed");
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}
