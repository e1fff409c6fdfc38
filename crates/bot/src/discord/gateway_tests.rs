// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tokio::sync::Mutex;
use yare::parameterized;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl EventHandler for Recorder {
    async fn handle(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}

const GUILD: Id = Id(100);

fn gateway_config(url: &str) -> GatewayConfig {
    GatewayConfig {
        url: url.to_string(),
        token: "token".to_string(),
        guild_id: GUILD,
        intents: INTENT_GUILDS | INTENT_GUILD_MEMBERS,
        max_retries: 3,
        max_delay_secs: 30,
        initial_delay_ms: 100,
        activities: vec!["one".to_string(), "two".to_string()],
        presence_interval: Duration::from_secs(60),
    }
}

fn gateway() -> Gateway {
    Gateway::new(gateway_config(GATEWAY_URL))
}

fn ready_payload(guilds: Value) -> GatewayPayload {
    payload(
        0,
        json!({
            "user": { "id": "800", "username": "tix" },
            "application": { "id": "800" },
            "guilds": guilds,
            "session_id": "sess",
            "resume_gateway_url": "wss://resume.example"
        }),
        Some(1),
        Some("READY"),
    )
}

fn payload(op: u8, d: Value, s: Option<u64>, t: Option<&str>) -> GatewayPayload {
    GatewayPayload {
        op,
        d,
        s,
        t: t.map(String::from),
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[parameterized(
    first = { 1, 100 },
    second = { 2, 200 },
    fourth = { 4, 800 },
    capped = { 12, 30_000 },
    huge = { 200, 30_000 },
)]
fn backoff_doubles_until_cap(attempt: u32, expected_ms: u64) {
    assert_eq!(
        backoff_delay(attempt, 100, 30),
        Duration::from_millis(expected_ms)
    );
}

#[parameterized(
    auth_failed = { 4004, true },
    invalid_intents = { 4013, true },
    disallowed_intents = { 4014, true },
    sharding = { 4010, true },
    unknown_error = { 4000, false },
    session_timeout = { 4009, false },
    normal = { 1000, false },
)]
fn fatal_close_codes(code: u16, fatal: bool) {
    assert_eq!(is_fatal_close(code), fatal);
}

#[test]
fn close_disposition_decides_resume() {
    assert_eq!(close_disposition(None), Disconnect::Reconnect { resume: true });
    assert_eq!(
        close_disposition(Some(4009)),
        Disconnect::Reconnect { resume: false }
    );
    assert!(matches!(close_disposition(Some(4004)), Disconnect::Fatal(_)));
}

#[test]
fn identify_carries_intents_and_presence() {
    let payload = identify_payload("tok", 3, Some("Helping".to_string()));
    assert_eq!(payload["op"], json!(2));
    assert_eq!(payload["d"]["token"], json!("tok"));
    assert_eq!(payload["d"]["intents"], json!(3));
    assert_eq!(
        payload["d"]["presence"]["activities"][0]["name"],
        json!("Helping")
    );

    let bare = identify_payload("tok", 3, None);
    assert!(bare["d"].get("presence").is_none());
}

#[test]
fn heartbeat_and_resume_payloads() {
    assert_eq!(heartbeat_payload(None), json!({ "op": 1, "d": null }));
    assert_eq!(heartbeat_payload(Some(42)), json!({ "op": 1, "d": 42 }));
    let resume = resume_payload("tok", "sess", Some(7));
    assert_eq!(resume["op"], json!(6));
    assert_eq!(resume["d"]["session_id"], json!("sess"));
    assert_eq!(resume["d"]["seq"], json!(7));
}

#[test]
fn presence_payload_is_op_3() {
    let payload = presence_payload("Tickets");
    assert_eq!(payload["op"], json!(3));
    assert_eq!(payload["d"]["status"], json!("online"));
}

#[test]
fn activities_rotate_in_order() {
    let activities = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let seen: Vec<_> = (0..4).map(|t| activity_at(&activities, t).unwrap()).collect();
    assert_eq!(seen, vec!["a", "b", "c", "a"]);
    assert_eq!(activity_at(&[], 5), None);

    let mut gw = gateway();
    assert_eq!(gw.next_activity().as_deref(), Some("one"));
    assert_eq!(gw.next_activity().as_deref(), Some("two"));
    assert_eq!(gw.next_activity().as_deref(), Some("one"));
}

#[test]
fn hello_interval_is_read() {
    let hello = payload(10, json!({ "heartbeat_interval": 41250 }), None, None);
    assert_eq!(hello_interval(&hello).unwrap(), 41250);

    let wrong = payload(11, Value::Null, None, None);
    assert!(hello_interval(&wrong).is_err());
}

#[tokio::test]
async fn ready_dispatch_opens_session_and_reaches_handler() {
    let mut gw = gateway();
    let recorder = Arc::new(Recorder::default());
    let ready = ready_payload(json!([{ "id": "100" }]));

    assert_eq!(gw.handle_payload(ready, &recorder), Action::Continue);
    assert_eq!(gw.state(), ConnectionState::Connected);
    assert_eq!(gw.seq, Some(1));
    assert_eq!(
        gw.session,
        Some(Session {
            id: "sess".to_string(),
            resume_url: "wss://resume.example".to_string(),
        })
    );

    settle().await;
    let events = recorder.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "READY");
}

#[tokio::test]
async fn unknown_dispatch_updates_seq_but_is_not_delivered() {
    let mut gw = gateway();
    let recorder = Arc::new(Recorder::default());
    let typing = payload(0, json!({}), Some(9), Some("TYPING_START"));

    assert_eq!(gw.handle_payload(typing, &recorder), Action::Continue);
    assert_eq!(gw.seq, Some(9));
    settle().await;
    assert!(recorder.events.lock().await.is_empty());
}

#[tokio::test]
async fn control_opcodes_map_to_actions() {
    let mut gw = gateway();
    let recorder = Arc::new(Recorder::default());

    assert_eq!(
        gw.handle_payload(payload(11, Value::Null, None, None), &recorder),
        Action::Ack
    );
    assert_eq!(
        gw.handle_payload(payload(1, Value::Null, None, None), &recorder),
        Action::Heartbeat
    );
    assert_eq!(
        gw.handle_payload(payload(7, Value::Null, None, None), &recorder),
        Action::Disconnect(Disconnect::Reconnect { resume: true })
    );
    assert_eq!(
        gw.handle_payload(payload(9, json!(false), None, None), &recorder),
        Action::Disconnect(Disconnect::Reconnect { resume: false })
    );
    assert_eq!(
        gw.handle_payload(payload(9, json!(true), None, None), &recorder),
        Action::Disconnect(Disconnect::Reconnect { resume: true })
    );
}

#[tokio::test]
async fn malformed_dispatch_is_skipped() {
    let mut gw = gateway();
    let recorder = Arc::new(Recorder::default());
    let broken = payload(0, json!({ "type": 0 }), Some(2), Some("CHANNEL_DELETE"));

    assert_eq!(gw.handle_payload(broken, &recorder), Action::Continue);
    settle().await;
    assert!(recorder.events.lock().await.is_empty());
}

#[tokio::test]
async fn ready_without_configured_guild_is_fatal() {
    let mut gw = gateway();
    let recorder = Arc::new(Recorder::default());

    let action = gw.handle_payload(ready_payload(json!([{ "id": "555" }])), &recorder);

    assert!(matches!(action, Action::Disconnect(Disconnect::Fatal(_))));
    assert_ne!(gw.state(), ConnectionState::Connected);
    assert_eq!(gw.session, None);
    settle().await;
    assert!(recorder.events.lock().await.is_empty());
}

#[test]
fn first_identify_carries_first_activity() {
    let mut gw = gateway();

    let first = gw.first_payload();

    assert_eq!(first["op"], json!(2));
    assert_eq!(first["d"]["presence"]["activities"][0]["name"], json!("one"));
    assert_eq!(gw.next_activity().as_deref(), Some("two"));
}

#[test]
fn resume_does_not_consume_an_activity() {
    let mut gw = gateway();
    gw.session = Some(Session {
        id: "sess".to_string(),
        resume_url: "wss://resume.example".to_string(),
    });
    gw.seq = Some(5);

    let first = gw.first_payload();

    assert_eq!(first["op"], json!(6));
    assert_eq!(first["d"]["seq"], json!(5));
    assert_eq!(gw.next_activity().as_deref(), Some("one"));
}

#[tokio::test]
async fn run_stops_when_ready_lacks_configured_guild() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let hello = json!({ "op": 10, "d": { "heartbeat_interval": 45000 } });
        ws.send(Message::Text(hello.to_string().into())).await.unwrap();
        let _identify = ws.next().await;
        let ready = json!({
            "op": 0,
            "s": 1,
            "t": "READY",
            "d": {
                "user": { "id": "800", "username": "tix" },
                "application": { "id": "800" },
                "guilds": [{ "id": "555" }],
                "session_id": "sess"
            }
        });
        ws.send(Message::Text(ready.to_string().into())).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut gw = Gateway::new(gateway_config(&format!("ws://{addr}")));
    let recorder = Arc::new(Recorder::default());
    let result = tokio::time::timeout(Duration::from_secs(5), gw.run(recorder))
        .await
        .unwrap();

    assert!(matches!(result, Err(Error::Gateway(_))));
    assert_eq!(gw.state(), ConnectionState::Disconnected);
    server.abort();
}
