use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use maze_chase_server::constants::FRAME_MS;
use maze_chase_server::engine::{GameEngine, GameEngineOptions};
use maze_chase_server::maze::Level;
use maze_chase_server::server_protocol::{parse_client_message, ParsedClientMessage};
use rand::Rng;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

/// One websocket client and the round it is playing, if any.
struct Session {
    tx: mpsc::Sender<OutboundMessage>,
    game: Option<GameEngine>,
    seed: u32,
}

struct ServerState {
    level: Level,
    sessions: HashMap<String, Session>,
}

impl ServerState {
    fn new(level: Level) -> Self {
        Self {
            level,
            sessions: HashMap::new(),
        }
    }
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let level = match Level::classic() {
        Ok(level) => level,
        Err(error) => {
            eprintln!("[server] built-in level is invalid: {error}");
            std::process::exit(2);
        }
    };

    let state = Arc::new(Mutex::new(ServerState::new(level)));
    start_frame_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("[server] failed to bind {bind_addr}: {error}");
            std::process::exit(2);
        }
    };

    println!("[server] listening on :{port}");
    if let Err(error) = axum::serve(listener, app).await {
        eprintln!("[server] runtime failed: {error}");
        std::process::exit(1);
    }
}

async fn healthz(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    let running = guard
        .sessions
        .values()
        .filter(|session| session.game.is_some())
        .count();
    Json(json!({
        "ok": true,
        "sessions": guard.sessions.len(),
        "running": running,
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        guard.sessions.insert(
            client_id.clone(),
            Session {
                tx: tx.clone(),
                game: None,
                seed: 0,
            },
        );
        println!("[server] {client_id} connected");
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = std::str::from_utf8(&raw) {
                    handle_client_message(&state, &client_id, text).await;
                } else {
                    let mut guard = state.lock().await;
                    send_error(&mut guard, &client_id, "invalid utf8 message");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        guard.sessions.remove(&client_id);
        println!("[server] {client_id} disconnected");
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let mut guard = state.lock().await;
    let Some(message) = parse_client_message(raw) else {
        send_error(&mut guard, client_id, "invalid message");
        return;
    };

    match message {
        ParsedClientMessage::Start { seed } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random::<u32>());
            start_session(&mut guard, client_id, seed);
        }
        ParsedClientMessage::Input { dir } => {
            if let Some(game) = guard
                .sessions
                .get_mut(client_id)
                .and_then(|session| session.game.as_mut())
            {
                game.set_player_direction(dir);
                return;
            }
            send_error(&mut guard, client_id, "game is not running");
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
    }
}

fn start_session(state: &mut ServerState, client_id: &str, seed: u32) {
    let engine = GameEngine::new(state.level.clone(), seed, GameEngineOptions::default());
    let welcome = build_welcome(&engine, seed);
    let Some(session) = state.sessions.get_mut(client_id) else {
        return;
    };
    session.game = Some(engine);
    session.seed = seed;
    println!("[server] {client_id} started a round with seed {seed}");
    send_to_client(state, client_id, &welcome, QueuePolicy::DisconnectOnFull);
}

fn build_welcome(engine: &GameEngine, seed: u32) -> Value {
    json!({
        "type": "welcome",
        "seed": seed,
        "world": engine.get_world_init(),
        "config": engine.config,
    })
}

fn start_frame_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            step_sessions(&mut guard);
        }
    });
}

/// Advances every running round by one frame and sends a `state` message
/// whenever a movement tick ran.
fn step_sessions(state: &mut ServerState) {
    let mut outgoing: Vec<(String, Value, QueuePolicy)> = Vec::new();

    for (client_id, session) in state.sessions.iter_mut() {
        let Some(game) = session.game.as_mut() else {
            continue;
        };
        if !game.step_frame() {
            continue;
        }
        let snapshot = game.build_snapshot(true);
        outgoing.push((
            client_id.clone(),
            json!({
                "type": "state",
                "snapshot": snapshot,
            }),
            QueuePolicy::DropOnFull,
        ));

        if game.is_ended() {
            let summary = game.build_summary();
            println!(
                "[server] {client_id} round over: seed={} score={} reason={:?}",
                session.seed, summary.score, summary.reason
            );
            outgoing.push((
                client_id.clone(),
                json!({
                    "type": "game_over",
                    "summary": summary,
                }),
                QueuePolicy::DisconnectOnFull,
            ));
            session.game = None;
        }
    }

    for (client_id, message, policy) in outgoing {
        send_to_client(state, &client_id, &message, policy);
    }
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(session) = state.sessions.get(client_id) {
        session
            .tx
            .try_send(OutboundMessage::Text(message.to_string()))
            .is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        disconnect_slow_client(state, client_id);
    }
}

fn send_error(state: &mut ServerState, client_id: &str, message: &str) {
    send_to_client(
        state,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn disconnect_slow_client(state: &mut ServerState, client_id: &str) {
    let Some(session) = state.sessions.remove(client_id) else {
        return;
    };
    let _ = session.tx.try_send(OutboundMessage::Close {
        code: 1013,
        reason: "send queue overflow".to_string(),
    });
    println!("[server] {client_id} dropped: send queue overflow");
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_server::types::Direction;

    fn state_with_client(client_id: &str) -> (ServerState, mpsc::Receiver<OutboundMessage>) {
        let mut state = ServerState::new(Level::classic().expect("classic level"));
        let (tx, rx) = mpsc::channel(1024);
        state.sessions.insert(
            client_id.to_string(),
            Session {
                tx,
                game: None,
                seed: 0,
            },
        );
        (state, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(OutboundMessage::Text(payload)) = rx.try_recv() {
            messages.push(serde_json::from_str(&payload).expect("outbound json"));
        }
        messages
    }

    #[test]
    fn make_id_is_unique_and_prefixed() {
        let first = make_id("client");
        let second = make_id("client");
        assert!(first.starts_with("client_"));
        assert_ne!(first, second);
    }

    #[test]
    fn start_sends_welcome_with_world_and_config() {
        let (mut state, mut rx) = state_with_client("c1");
        start_session(&mut state, "c1", 77);

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "welcome");
        assert_eq!(messages[0]["seed"], 77);
        assert_eq!(messages[0]["world"]["width"], 28);
        assert_eq!(messages[0]["config"]["moveDelayFrames"], 8);
    }

    #[test]
    fn frames_produce_state_messages_on_ticks_only() {
        let (mut state, mut rx) = state_with_client("c1");
        start_session(&mut state, "c1", 5);
        drain(&mut rx);

        if let Some(game) = state
            .sessions
            .get_mut("c1")
            .and_then(|session| session.game.as_mut())
        {
            game.set_player_direction(Direction::Left);
        }
        for _ in 0..16 {
            step_sessions(&mut state);
        }

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|message| message["type"] == "state"));
        assert_eq!(messages[1]["snapshot"]["tick"], 2);
    }

    #[test]
    fn idle_sessions_are_not_stepped() {
        let (mut state, mut rx) = state_with_client("c1");
        for _ in 0..32 {
            step_sessions(&mut state);
        }
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn full_queue_disconnects_on_strict_policy() {
        let mut state = ServerState::new(Level::classic().expect("classic level"));
        let (tx, _rx) = mpsc::channel(1);
        state.sessions.insert(
            "slow".to_string(),
            Session {
                tx,
                game: None,
                seed: 0,
            },
        );
        let message = json!({ "type": "pong", "t": 1 });
        send_to_client(&mut state, "slow", &message, QueuePolicy::DropOnFull);
        send_to_client(&mut state, "slow", &message, QueuePolicy::DropOnFull);
        assert!(state.sessions.contains_key("slow"));
        send_to_client(&mut state, "slow", &message, QueuePolicy::DisconnectOnFull);
        assert!(!state.sessions.contains_key("slow"));
    }
}
