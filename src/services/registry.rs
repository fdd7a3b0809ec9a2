//! The session registry. Maps game ids to `GameRecord`s, each carrying its
//! own lock so concurrent games never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{GameError, StateError};
use crate::game::{Game, Match, Variant};

/// A game plus whatever match it belongs to, plus the two booleans that
/// gate background drivers: at most one CPU-turn task and one CPU-picking
/// task may run per game at a time, so `dispatch`/`timers` check-and-set
/// these before spawning instead of spawning unconditionally.
pub struct GameRecord {
    pub game: Game,
    pub match_data: Option<Match>,
    pub cpu_turn_active: bool,
    pub cpu_picking_active: bool,
}

impl GameRecord {
    fn new(game: Game) -> Self {
        Self {
            game,
            match_data: None,
            cpu_turn_active: false,
            cpu_picking_active: false,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    games: HashMap<String, Arc<Mutex<GameRecord>>>,
}

/// An 8-hex short id carved from a fresh uuid. Collisions are astronomically
/// unlikely but `create_game` retries on one rather than trusting that.
fn short_game_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Shared handle into the registry. Cloning is cheap (`Arc` underneath);
/// every connection handler, timer sweep, and CPU driver holds one.
#[derive(Clone)]
pub struct SessionRegistry {
    state: Arc<std::sync::RwLock<RegistryState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(std::sync::RwLock::new(RegistryState::default())),
        }
    }

    pub fn create_game(&self, variant: Variant, max_players: usize, picking_timeout: u64, turn_timeout: u64) -> Arc<Mutex<GameRecord>> {
        let mut state = self.state.write().expect("registry lock poisoned");
        loop {
            let id = short_game_id();
            if let std::collections::hash_map::Entry::Vacant(entry) = state.games.entry(id.clone()) {
                let game = Game::new(id, variant, max_players, picking_timeout, turn_timeout);
                let record = Arc::new(Mutex::new(GameRecord::new(game)));
                entry.insert(record.clone());
                return record;
            }
        }
    }

    pub fn get(&self, game_id: &str) -> Result<Arc<Mutex<GameRecord>>, GameError> {
        self.state
            .read()
            .expect("registry lock poisoned")
            .games
            .get(game_id)
            .cloned()
            .ok_or_else(|| StateError::GameNotFound.into())
    }

    pub fn remove(&self, game_id: &str) {
        self.state.write().expect("registry lock poisoned").games.remove(game_id);
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.state.read().expect("registry lock poisoned").games.keys().cloned().collect()
    }

    pub fn total_games(&self) -> usize {
        self.state.read().expect("registry lock poisoned").games.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Attempts to claim the CPU-turn driver slot; returns `true` if the caller
/// now owns it and must spawn the driver task (and clear it when done).
pub fn try_start_cpu_turn_driver(record: &mut GameRecord) -> bool {
    if record.cpu_turn_active {
        return false;
    }
    record.cpu_turn_active = true;
    true
}

pub fn clear_cpu_turn_driver(record: &mut GameRecord) {
    record.cpu_turn_active = false;
}

pub fn try_start_cpu_picking_worker(record: &mut GameRecord) -> bool {
    if record.cpu_picking_active {
        return false;
    }
    record.cpu_picking_active = true;
    true
}

pub fn clear_cpu_picking_worker(record: &mut GameRecord) {
    record.cpu_picking_active = false;
}
