use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board::BoardEnds;
use super::board::PlayedTile;
use super::player::Player;
use super::tile::Tile;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Picking,
    Playing,
    Finished,
}

/// Only `Block` has semantic effect in the rules engine; `Draw` and
/// `AllFives` are tagged and serialized but treated identically to `Block`
/// until further rules are specified for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Block,
    Draw,
    AllFives,
}

/// The number of face-down tiles dealt into the picking grid (the whole
/// double-six set).
pub const GRID_SIZE: u8 = 28;
pub const HAND_SIZE: usize = 6;

#[derive(Debug, Clone)]
pub struct Game {
    pub id: String,
    pub variant: Variant,
    pub status: GameStatus,
    pub players: Vec<Player>,
    pub current_turn: Option<String>,
    pub board: Vec<PlayedTile>,
    pub boneyard: Vec<Tile>,
    pub ends: BoardEnds,
    pub max_players: usize,
    pub winner_id: Option<String>,
    pub round_number: u32,
    pub match_id: Option<String>,
    pub picking_tiles: HashMap<u8, Tile>,
    pub picking_started_at: Option<Instant>,
    pub turn_started_at: Option<Instant>,
    pub picking_timeout: u64,
    pub turn_timeout: u64,
    pub last_activity: Instant,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(
        id: String,
        variant: Variant,
        max_players: usize,
        picking_timeout: u64,
        turn_timeout: u64,
    ) -> Self {
        Self {
            id,
            variant,
            status: GameStatus::Waiting,
            players: Vec::new(),
            current_turn: None,
            board: Vec::new(),
            boneyard: Vec::new(),
            ends: BoardEnds::default(),
            max_players,
            winner_id: None,
            round_number: 1,
            match_id: None,
            picking_tiles: HashMap::new(),
            picking_started_at: None,
            turn_started_at: None,
            picking_timeout,
            turn_timeout,
            last_activity: Instant::now(),
            created_at: Utc::now(),
        }
    }

    pub fn get_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn get_player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn creator_id(&self) -> Option<&str> {
        self.players.first().map(|p| p.id.as_str())
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn has_connected_humans(&self) -> bool {
        self.players.iter().any(|p| p.connected && !p.is_cpu)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }
}

/// `WAITING -> PICKING`: clear hands, shuffle the full set into the fixed
/// 0..28 grid, start the picking clock.
pub fn start_picking(game: &mut Game, rng: &dyn RandomSource) {
    for player in &mut game.players {
        player.hand.clear();
    }
    let mut tiles = Tile::full_set();
    rng.shuffle_tiles(&mut tiles);

    game.picking_tiles = tiles
        .into_iter()
        .enumerate()
        .map(|(i, t)| (i as u8, t))
        .collect();
    game.boneyard.clear();
    game.board.clear();
    game.ends = BoardEnds::default();
    game.winner_id = None;
    game.current_turn = None;
    game.status = GameStatus::Picking;
    game.picking_started_at = Some(Instant::now());
}

/// `PICKING -> PLAYING`, if every player's hand is exactly `HAND_SIZE`.
/// `starting_override` is the previous round's winner, when called from
/// `start_new_round`; otherwise the starting seat is computed from hands.
pub fn try_begin_play(game: &mut Game, starting_override: Option<String>) -> bool {
    if game.players.is_empty() || !game.players.iter().all(|p| p.hand.len() == HAND_SIZE) {
        return false;
    }

    game.boneyard.extend(game.picking_tiles.drain().map(|(_, t)| t));

    let starter = starting_override
        .filter(|id| game.get_player(id).is_some())
        .or_else(|| compute_starting_player(game));

    game.current_turn = starter;
    game.turn_started_at = Some(Instant::now());
    game.status = GameStatus::Playing;
    true
}

/// Highest double opens (tie-break: highest pip value, then seat order);
/// failing that, the seat holding the single highest-total tile.
fn compute_starting_player(game: &Game) -> Option<String> {
    let mut best_double: Option<(u8, &str)> = None;
    for player in &game.players {
        for tile in &player.hand {
            if tile.is_double() {
                let better = match best_double {
                    None => true,
                    Some((pip, _)) => tile.left > pip,
                };
                if better {
                    best_double = Some((tile.left, player.id.as_str()));
                }
            }
        }
    }
    if let Some((_, id)) = best_double {
        return Some(id.to_string());
    }

    let mut best_total: Option<(u32, &str)> = None;
    for player in &game.players {
        for tile in &player.hand {
            let total = tile.total();
            let better = match best_total {
                None => true,
                Some((t, _)) => total > t,
            };
            if better {
                best_total = Some((total, player.id.as_str()));
            }
        }
    }
    best_total.map(|(_, id)| id.to_string())
}

pub fn advance_turn(game: &mut Game) {
    let Some(current) = game.current_turn.clone() else {
        return;
    };
    let Some(idx) = game.player_index(&current) else {
        return;
    };
    let next = (idx + 1) % game.players.len();
    game.current_turn = Some(game.players[next].id.clone());
    game.turn_started_at = Some(Instant::now());
}

pub fn finish_round(game: &mut Game, winner_id: String) {
    game.status = GameStatus::Finished;
    game.winner_id = Some(winner_id);
    game.current_turn = None;
}

/// `FINISHED -> WAITING`: clear round state but preserve scores (tracked by
/// the owning Match). The caller is responsible for setting `round_number`
/// from the match's completed-round count.
pub fn start_new_round(game: &mut Game) {
    game.status = GameStatus::Waiting;
    game.board.clear();
    game.boneyard.clear();
    game.ends = BoardEnds::default();
    game.winner_id = None;
    game.picking_tiles.clear();
    game.picking_started_at = None;
    game.turn_started_at = None;
    for player in &mut game.players {
        player.hand.clear();
    }
}
