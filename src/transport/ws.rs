//! The WebSocket endpoint: a raw `tokio-tungstenite` accept loop serving
//! `/ws/{game_id}/{player_id}`, closing with code 4004 for an unknown game.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response as HandshakeResponse};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tokio_tungstenite::WebSocketStream;

use crate::game::{Game, Player};
use crate::rng::RandomSource;
use crate::services::dispatch::{self, views_for_all};
use crate::services::registry::{
    clear_cpu_picking_worker, clear_cpu_turn_driver, try_start_cpu_picking_worker,
    try_start_cpu_turn_driver, GameRecord, SessionRegistry,
};
use crate::services::{cpu_driver, picking_worker};

use super::protocol::{ClientFrame, ServerEvent};

pub const GAME_NOT_FOUND_CLOSE: u16 = 4004;

type Sink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// One entry per live connection to a game, so broadcasts can reach every
/// seat without re-opening the registry lock for each recipient.
#[derive(Default, Clone)]
pub struct ConnectionHub {
    conns: Arc<Mutex<HashMap<(String, String), Arc<Mutex<Sink>>>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    async fn register(&self, game_id: String, player_id: String, sink: Sink) {
        let handle = Arc::new(Mutex::new(sink));
        self.conns.lock().await.insert((game_id, player_id), handle);
    }

    async fn unregister(&self, game_id: &str, player_id: &str) {
        self.conns.lock().await.remove(&(game_id.to_string(), player_id.to_string()));
    }

    async fn send_to(&self, game_id: &str, player_id: &str, event: &ServerEvent) {
        let handle = self.conns.lock().await.get(&(game_id.to_string(), player_id.to_string())).cloned();
        if let Some(handle) = handle {
            if let Ok(text) = serde_json::to_string(event) {
                let _ = handle.lock().await.send(Message::Text(text.into())).await;
            }
        }
    }

    /// Sends each connected seat its own sanitized view of the game.
    pub async fn broadcast_state(&self, game_id: &str, game: &Game, amatch: Option<&crate::game::Match>) {
        for (player_id, view) in views_for_all(game, amatch) {
            self.send_to(game_id, &player_id, &ServerEvent::GameState(Box::new(view))).await;
        }
    }

    /// Sends the same event to every connected seat of a game.
    pub async fn broadcast_event(&self, game_id: &str, game: &Game, event: &ServerEvent) {
        for player in &game.players {
            self.send_to(game_id, &player.id, event).await;
        }
    }
}

pub async fn handle_connection(
    stream: WebSocketStream<TcpStream>,
    game_id: String,
    player_id: String,
    player_name: String,
    registry: SessionRegistry,
    hub: ConnectionHub,
    rng: Arc<dyn RandomSource>,
) {
    let (sink, mut read) = stream.split();

    let record = match registry.get(&game_id) {
        Ok(record) => record,
        Err(_) => {
            let mut sink = sink;
            let _ = sink
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::from(GAME_NOT_FOUND_CLOSE),
                    reason: "game not found".into(),
                })))
                .await;
            return;
        }
    };

    let newly_joined = match join_or_reconnect(&record, &player_id, &player_name).await {
        Ok(newly_joined) => newly_joined,
        Err(err) => {
            let mut sink = sink;
            let _ = sink
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Policy,
                    reason: err.to_string().into(),
                })))
                .await;
            return;
        }
    };
    hub.register(game_id.clone(), player_id.clone(), sink).await;

    {
        let guard = record.lock().await;
        if newly_joined {
            hub.broadcast_event(
                &game_id,
                &guard.game,
                &ServerEvent::PlayerJoined { player_id: player_id.clone(), name: player_name.clone() },
            )
            .await;
        }
        hub.broadcast_state(&game_id, &guard.game, guard.match_data.as_ref()).await;
    }

    while let Some(Ok(msg)) = read.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(frame) = serde_json::from_str::<ClientFrame>(&text) else {
            hub.send_to(
                &game_id,
                &player_id,
                &ServerEvent::Error {
                    code: "malformed_frame".into(),
                    message: "malformed frame: missing or invalid field".into(),
                },
            )
            .await;
            continue;
        };

        process_frame(&hub, &record, &game_id, &player_id, frame, rng.clone()).await;
    }

    {
        let mut guard = record.lock().await;
        if let Some(p) = guard.game.get_player_mut(&player_id) {
            p.connected = false;
        }
        hub.broadcast_event(&game_id, &guard.game, &ServerEvent::PlayerLeft { player_id: player_id.clone() }).await;
    }
    hub.unregister(&game_id, &player_id).await;
}

/// Reconnects an existing seat or adds a new one. Returns `Ok(true)` only
/// when a new player was added, so the caller knows to announce it; closes
/// the connection with `GameFull`/`NameTaken` if it can't seat them.
async fn join_or_reconnect(
    record: &Arc<Mutex<GameRecord>>,
    player_id: &str,
    player_name: &str,
) -> Result<bool, crate::error::GameError> {
    use crate::error::StateError;

    let mut guard = record.lock().await;
    if let Some(existing) = guard.game.get_player_mut(player_id) {
        existing.connected = true;
        return Ok(false);
    }
    if guard.game.is_full() {
        return Err(StateError::GameFull.into());
    }
    if guard.game.players.iter().any(|p| p.name == player_name) {
        return Err(StateError::NameTaken.into());
    }
    guard.game.players.push(Player::new(player_id.to_string(), player_name.to_string(), false));
    Ok(true)
}

async fn process_frame(
    hub: &ConnectionHub,
    record: &Arc<Mutex<GameRecord>>,
    game_id: &str,
    player_id: &str,
    frame: ClientFrame,
    rng: Arc<dyn RandomSource>,
) {
    let result = {
        let mut guard = record.lock().await;
        match frame {
            ClientFrame::PlayTile { tile, side } => dispatch::handle_play_tile(&mut guard, player_id, tile, side),
            ClientFrame::PassTurn => dispatch::handle_pass_turn(&mut guard, player_id),
            ClientFrame::ClaimTile { position } => dispatch::handle_claim_tile(&mut guard, player_id, position),
            ClientFrame::StartGame => dispatch::handle_start_game(&mut guard, player_id, rng.as_ref()),
            ClientFrame::AddCpu => dispatch::handle_add_cpu(&mut guard, player_id, rng.as_ref()),
            ClientFrame::GetValidMoves => dispatch::handle_get_valid_moves(&guard, player_id),
            ClientFrame::NextRound => dispatch::handle_next_round(&mut guard, player_id),
            ClientFrame::Reaction { emoji } => Ok(dispatch::handle_reaction(player_id, emoji)),
        }
    };

    match result {
        Ok(outcome) => {
            for event in outcome.reply_only {
                hub.send_to(game_id, player_id, &event).await;
            }
            if outcome.state_changed {
                let guard = record.lock().await;
                hub.broadcast_state(game_id, &guard.game, guard.match_data.as_ref()).await;
            }
            for event in outcome.extra {
                let guard = record.lock().await;
                hub.broadcast_event(game_id, &guard.game, &event).await;
            }
            maybe_spawn_cpu_drivers(record, game_id, rng, hub).await;
        }
        Err(err) => {
            hub.send_to(game_id, player_id, &ServerEvent::Error { code: err.code().to_string(), message: err.to_string() }).await;
        }
    }
}

/// After any state change, checks whether a CPU driver or picking worker
/// needs to be (re)started, and spawns them if so. Cheap to call on every
/// frame: the `*_active` flags make it a no-op when one is already running.
async fn maybe_spawn_cpu_drivers(record: &Arc<Mutex<GameRecord>>, game_id: &str, rng: Arc<dyn RandomSource>, hub: &ConnectionHub) {
    let spawn_turn = {
        let mut guard = record.lock().await;
        let is_cpu_turn = guard
            .game
            .current_turn
            .as_deref()
            .and_then(|id| guard.game.get_player(id))
            .is_some_and(|p| p.is_cpu);
        is_cpu_turn && try_start_cpu_turn_driver(&mut guard)
    };
    if spawn_turn {
        let record = record.clone();
        let game_id = game_id.to_string();
        let rng = rng.clone();
        let hub = hub.clone();
        tokio::spawn(async move {
            cpu_driver::run(record.clone(), game_id, rng, hub).await;
            clear_cpu_turn_driver(&mut *record.lock().await);
        });
    }

    let cpu_pickers: Vec<String> = {
        let guard = record.lock().await;
        if guard.game.status != crate::game::GameStatus::Picking {
            Vec::new()
        } else {
            guard
                .game
                .players
                .iter()
                .filter(|p| p.is_cpu && p.hand.len() < crate::game::HAND_SIZE)
                .map(|p| p.id.clone())
                .collect()
        }
    };
    for cpu_id in cpu_pickers {
        let spawn = try_start_cpu_picking_worker(&mut *record.lock().await);
        if !spawn {
            continue;
        }
        let record = record.clone();
        let game_id = game_id.to_string();
        let rng = rng.clone();
        let hub = hub.clone();
        tokio::spawn(async move {
            picking_worker::run(record.clone(), game_id, cpu_id, rng, hub).await;
            clear_cpu_picking_worker(&mut *record.lock().await);
        });
    }
}

/// Raw TCP accept loop for `/ws/{game_id}/{player_id}?name=...`. Uses
/// `tokio-tungstenite` directly rather than an HTTP framework's websocket
/// extractor, since the path carries routing information the handshake
/// itself must parse.
pub async fn serve(addr: SocketAddr, registry: SessionRegistry, hub: ConnectionHub, rng: Arc<dyn RandomSource>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    loop {
        let (stream, _) = listener.accept().await?;
        let registry = registry.clone();
        let hub = hub.clone();
        let rng = rng.clone();
        tokio::spawn(async move {
            let mut route = None;
            let callback = |req: &Request, resp: HandshakeResponse| {
                route = parse_ws_path(req.uri().path(), req.uri().query());
                Ok(resp)
            };
            let accepted = tokio_tungstenite::accept_hdr_async(stream, callback).await;
            let (Ok(stream), Some((game_id, player_id, player_name))) = (accepted, route) else {
                return;
            };
            handle_connection(stream, game_id, player_id, player_name, registry, hub, rng).await;
        });
    }
}

fn parse_ws_path(path: &str, query: Option<&str>) -> Option<(String, String, String)> {
    let mut segments = path.trim_start_matches('/').split('/');
    if segments.next()? != "ws" {
        return None;
    }
    let game_id = segments.next()?.to_string();
    let player_id = segments.next()?.to_string();
    let player_name = query
        .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("name=")))
        .map(|name| name.to_string())
        .unwrap_or_else(|| player_id.clone());
    Some((game_id, player_id, player_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_code_matches_documented_value() {
        assert_eq!(GAME_NOT_FOUND_CLOSE, 4004);
    }

    #[test]
    fn parses_game_and_player_ids_from_path() {
        let parsed = parse_ws_path("/ws/game-1/player-2", Some("name=Alice"));
        assert_eq!(parsed, Some(("game-1".to_string(), "player-2".to_string(), "Alice".to_string())));
    }

    #[test]
    fn falls_back_to_player_id_as_name_when_missing() {
        let parsed = parse_ws_path("/ws/game-1/player-2", None);
        assert_eq!(parsed, Some(("game-1".to_string(), "player-2".to_string(), "player-2".to_string())));
    }

    #[test]
    fn rejects_non_ws_paths() {
        assert_eq!(parse_ws_path("/api/games", None), None);
    }

    #[tokio::test]
    async fn join_or_reconnect_rejects_duplicate_name() {
        use crate::game::{Game, Variant};
        let game = Game::new("g".into(), Variant::Block, 4, 45, 30);
        let record = Arc::new(Mutex::new(GameRecord { game, match_data: None, cpu_turn_active: false, cpu_picking_active: false }));
        assert!(join_or_reconnect(&record, "p0", "Alice").await.unwrap());
        let err = join_or_reconnect(&record, "p1", "Alice").await.unwrap_err();
        assert_eq!(err.code(), "name_taken");
    }

    #[tokio::test]
    async fn join_or_reconnect_treats_same_player_id_as_reconnect() {
        use crate::game::{Game, Variant};
        let game = Game::new("g".into(), Variant::Block, 4, 45, 30);
        let record = Arc::new(Mutex::new(GameRecord { game, match_data: None, cpu_turn_active: false, cpu_picking_active: false }));
        assert!(join_or_reconnect(&record, "p0", "Alice").await.unwrap());
        assert!(!join_or_reconnect(&record, "p0", "Alice").await.unwrap());
    }
}
