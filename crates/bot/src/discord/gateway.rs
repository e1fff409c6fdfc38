// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discord gateway connection.
//!
//! Keeps one websocket session alive:
//! - Hello, then Identify (or Resume after a drop)
//! - heartbeats at the announced interval, reconnecting on a missed ack
//! - dispatch of events to an [`EventHandler`], one task per event
//! - presence rotation through the configured activities
//! - reconnection with exponential backoff on close, op 7 and op 9

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use tix_core::Id;

use super::model::{Event, GatewayPayload};
use crate::config::Config;
use crate::error::{Error, Result};

pub const GATEWAY_URL: &str = "wss://gateway.discord.gg";
const GATEWAY_QUERY: &str = "/?v=10&encoding=json";

pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MEMBERS: u64 = 1 << 1;

/// Gateway opcodes.
pub mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const PRESENCE_UPDATE: u8 = 3;
    pub const RESUME: u8 = 6;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Receives dispatched gateway events.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: Event);
}

/// Configuration for the gateway connection.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    /// The one guild the bot serves; READY without it is fatal.
    pub guild_id: Id,
    pub intents: u64,
    /// Maximum consecutive reconnection attempts.
    pub max_retries: u32,
    /// Maximum delay between reconnection attempts (seconds).
    pub max_delay_secs: u64,
    /// Initial delay for exponential backoff (milliseconds).
    pub initial_delay_ms: u64,
    pub activities: Vec<String>,
    pub presence_interval: Duration,
}

impl GatewayConfig {
    pub fn from_config(config: &Config, token: &str) -> Self {
        GatewayConfig {
            url: GATEWAY_URL.to_string(),
            token: token.to_string(),
            guild_id: config.guild_id,
            intents: INTENT_GUILDS | INTENT_GUILD_MEMBERS,
            max_retries: config.reconnect_max_retries,
            max_delay_secs: config.reconnect_max_delay_secs,
            initial_delay_ms: 1000,
            activities: config.presence.activities.clone(),
            presence_interval: Duration::from_secs(config.presence.interval_secs.max(1)),
        }
    }
}

/// State of the gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Ready or resumed; events are flowing.
    Connected,
    Reconnecting { attempt: u32 },
}

/// Session details needed to resume after a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    id: String,
    resume_url: String,
}

/// Why a connection ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Disconnect {
    Reconnect { resume: bool },
    Fatal(String),
}

/// What to do after handling one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Continue,
    Heartbeat,
    Ack,
    Disconnect(Disconnect),
}

/// A gateway client.
pub struct Gateway {
    config: GatewayConfig,
    state: ConnectionState,
    session: Option<Session>,
    seq: Option<u64>,
    presence_tick: usize,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Gateway {
            config,
            state: ConnectionState::Disconnected,
            session: None,
            seq: None,
            presence_tick: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Run until a fatal close or until reconnection retries run out.
    pub async fn run<H: EventHandler>(&mut self, handler: Arc<H>) -> Result<()> {
        let mut attempt = 0u32;

        loop {
            self.state = if attempt == 0 {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting { attempt }
            };

            let outcome = self.connect_once(&handler).await;
            if self.state == ConnectionState::Connected {
                attempt = 0;
            }
            self.state = ConnectionState::Disconnected;

            match outcome {
                Ok(Disconnect::Fatal(reason)) => {
                    error!("gateway closed: {}", reason);
                    return Err(Error::Gateway(reason));
                }
                Ok(Disconnect::Reconnect { resume }) => {
                    if !resume {
                        self.session = None;
                        self.seq = None;
                    }
                    info!(resume, "gateway reconnecting");
                }
                Err(e) => warn!("gateway connection failed: {}", e),
            }

            attempt += 1;
            if attempt > self.config.max_retries {
                return Err(Error::Gateway(
                    "max reconnection retries exceeded".to_string(),
                ));
            }
            let delay = backoff_delay(
                attempt,
                self.config.initial_delay_ms,
                self.config.max_delay_secs,
            );
            debug!(attempt, ?delay, "waiting before reconnect");
            tokio::time::sleep(delay).await;
        }
    }

    async fn connect_once<H: EventHandler>(&mut self, handler: &Arc<H>) -> Result<Disconnect> {
        let base = match &self.session {
            Some(session) => session.resume_url.clone(),
            None => self.config.url.clone(),
        };
        let url = format!("{}{}", base.trim_end_matches('/'), GATEWAY_QUERY);
        let (ws, _) = tokio_tungstenite::connect_async(&url).await?;
        let (mut sink, mut source) = ws.split();
        debug!("connected to {}", url);

        let heartbeat_ms = read_hello(&mut source).await?;
        let first = self.first_payload();
        send_payload(&mut sink, &first).await?;

        let period = Duration::from_millis(heartbeat_ms.max(1));
        let mut heartbeat = interval_at(Instant::now() + period / 2, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let presence_period = self.config.presence_interval;
        let mut presence = interval_at(Instant::now() + presence_period, presence_period);
        let rotate = self.config.activities.len() > 1;
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        warn!("no heartbeat ack, reconnecting");
                        let _ = sink.close().await;
                        return Ok(Disconnect::Reconnect { resume: true });
                    }
                    send_payload(&mut sink, &heartbeat_payload(self.seq)).await?;
                    awaiting_ack = true;
                }

                _ = presence.tick(), if rotate && self.state == ConnectionState::Connected => {
                    if let Some(activity) = self.next_activity() {
                        send_payload(&mut sink, &presence_payload(&activity)).await?;
                    }
                }

                msg = source.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let payload: GatewayPayload = match serde_json::from_str(&text) {
                                Ok(payload) => payload,
                                Err(e) => {
                                    warn!("undecodable gateway payload: {}", e);
                                    continue;
                                }
                            };
                            match self.handle_payload(payload, handler) {
                                Action::Continue => {}
                                Action::Ack => awaiting_ack = false,
                                Action::Heartbeat => {
                                    send_payload(&mut sink, &heartbeat_payload(self.seq)).await?;
                                }
                                Action::Disconnect(reason) => {
                                    let _ = sink.close().await;
                                    return Ok(reason);
                                }
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let code = frame.as_ref().map(|f| u16::from(f.code));
                            info!(?code, "gateway sent close");
                            return Ok(close_disposition(code));
                        }
                        Some(Ok(Message::Ping(data))) => {
                            sink.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(_)) => {
                            // Binary and pong frames are not used with JSON encoding
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            info!("gateway stream ended");
                            return Ok(Disconnect::Reconnect { resume: true });
                        }
                    }
                }
            }
        }
    }

    fn handle_payload<H: EventHandler>(
        &mut self,
        payload: GatewayPayload,
        handler: &Arc<H>,
    ) -> Action {
        match payload.op {
            op::DISPATCH => {
                if let Some(seq) = payload.s {
                    self.seq = Some(seq);
                }
                let Some(name) = payload.t else {
                    return Action::Continue;
                };
                if name == "RESUMED" {
                    info!("gateway session resumed");
                    self.state = ConnectionState::Connected;
                    return Action::Continue;
                }
                let event = match Event::parse(&name, payload.d) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(event = %name, "failed to decode event: {}", e);
                        return Action::Continue;
                    }
                };
                if let Event::Ready(ready) = &event {
                    if !ready.guilds.iter().any(|g| g.id == self.config.guild_id) {
                        return Action::Disconnect(Disconnect::Fatal(format!(
                            "bot is not a member of guild {}",
                            self.config.guild_id
                        )));
                    }
                    self.state = ConnectionState::Connected;
                    self.session = Some(Session {
                        id: ready.session_id.clone(),
                        resume_url: ready
                            .resume_gateway_url
                            .clone()
                            .unwrap_or_else(|| self.config.url.clone()),
                    });
                }
                if !matches!(event, Event::Other(_)) {
                    let handler = Arc::clone(handler);
                    tokio::spawn(async move { handler.handle(event).await });
                }
                Action::Continue
            }
            op::HEARTBEAT => Action::Heartbeat,
            op::HEARTBEAT_ACK => Action::Ack,
            op::RECONNECT => {
                info!("gateway requested reconnect");
                Action::Disconnect(Disconnect::Reconnect { resume: true })
            }
            op::INVALID_SESSION => {
                let resumable = payload.d.as_bool().unwrap_or(false);
                warn!(resumable, "gateway session invalidated");
                Action::Disconnect(Disconnect::Reconnect { resume: resumable })
            }
            other => {
                debug!(op = other, "ignoring gateway opcode");
                Action::Continue
            }
        }
    }

    /// Resume when a session survives, otherwise Identify with the next activity.
    fn first_payload(&mut self) -> Value {
        if let Some(session) = &self.session {
            return resume_payload(&self.config.token, &session.id, self.seq);
        }
        let activity = self.next_activity();
        identify_payload(&self.config.token, self.config.intents, activity)
    }

    fn next_activity(&mut self) -> Option<String> {
        let activity = activity_at(&self.config.activities, self.presence_tick).map(String::from);
        self.presence_tick = self.presence_tick.wrapping_add(1);
        activity
    }
}

async fn send_payload(sink: &mut WsSink, payload: &Value) -> Result<()> {
    let text = serde_json::to_string(payload)?;
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Waits for Hello and returns the heartbeat interval in milliseconds.
async fn read_hello(source: &mut WsSource) -> Result<u64> {
    while let Some(msg) = source.next().await {
        if let Message::Text(text) = msg? {
            let payload: GatewayPayload = serde_json::from_str(&text)?;
            return hello_interval(&payload);
        }
    }
    Err(Error::Gateway("connection closed before hello".to_string()))
}

fn hello_interval(payload: &GatewayPayload) -> Result<u64> {
    if payload.op != op::HELLO {
        return Err(Error::Gateway(format!(
            "expected hello, got opcode {}",
            payload.op
        )));
    }
    payload
        .d
        .get("heartbeat_interval")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Gateway("hello without heartbeat_interval".to_string()))
}

/// Exponential backoff: `initial * 2^(attempt - 1)`, capped at `max_secs`.
pub fn backoff_delay(attempt: u32, initial_ms: u64, max_secs: u64) -> Duration {
    let exp = attempt.saturating_sub(1).min(20);
    let delay = initial_ms.saturating_mul(1u64 << exp);
    Duration::from_millis(delay.min(max_secs.saturating_mul(1000)))
}

/// Close codes after which reconnecting cannot help.
pub fn is_fatal_close(code: u16) -> bool {
    matches!(code, 4004 | 4010..=4014)
}

fn close_disposition(code: Option<u16>) -> Disconnect {
    match code {
        Some(code) if is_fatal_close(code) => {
            Disconnect::Fatal(format!("gateway closed with code {code}"))
        }
        // Invalid seq or session timed out: start over
        Some(4007 | 4009) => Disconnect::Reconnect { resume: false },
        _ => Disconnect::Reconnect { resume: true },
    }
}

/// The activity shown at a given rotation step.
pub fn activity_at(activities: &[String], tick: usize) -> Option<&str> {
    if activities.is_empty() {
        return None;
    }
    Some(activities[tick % activities.len()].as_str())
}

fn activity_json(activity: &str) -> Value {
    json!({
        "since": null,
        "activities": [{ "name": activity, "type": 0 }],
        "status": "online",
        "afk": false,
    })
}

pub fn identify_payload(token: &str, intents: u64, activity: Option<String>) -> Value {
    let mut d = json!({
        "token": token,
        "intents": intents,
        "properties": {
            "os": std::env::consts::OS,
            "browser": "tixd",
            "device": "tixd",
        },
    });
    if let Some(activity) = activity {
        d["presence"] = activity_json(&activity);
    }
    json!({ "op": op::IDENTIFY, "d": d })
}

pub fn resume_payload(token: &str, session_id: &str, seq: Option<u64>) -> Value {
    json!({
        "op": op::RESUME,
        "d": { "token": token, "session_id": session_id, "seq": seq },
    })
}

pub fn heartbeat_payload(seq: Option<u64>) -> Value {
    json!({ "op": op::HEARTBEAT, "d": seq })
}

pub fn presence_payload(activity: &str) -> Value {
    json!({ "op": op::PRESENCE_UPDATE, "d": activity_json(activity) })
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
