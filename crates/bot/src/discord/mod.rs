// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discord API access: wire types, the REST client and the gateway.

pub mod gateway;
pub mod model;
pub mod rest;

pub use gateway::{EventHandler, Gateway, GatewayConfig};
pub use rest::RestClient;
