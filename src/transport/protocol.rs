//! Wire protocol: client and server JSON frames, tagged on `type`,
//! snake_case.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{PlayerView, Side};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    PlayTile { tile: (u8, u8), side: Side },
    PassTurn,
    StartGame,
    AddCpu,
    GetValidMoves,
    ClaimTile { position: u8 },
    Reaction { emoji: String },
    NextRound,
}

/// Score ledger carried on `round_over`/`match_over`; exactly one of the two
/// maps is populated depending on whether the match is team or free-for-all.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreSnapshot {
    pub individual: HashMap<String, i32>,
    pub team: HashMap<u8, i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    GameState(Box<PlayerView>),
    ValidMoves { moves: Vec<((u8, u8), Side)> },
    GameStarted,
    RoundStarted { round_number: u32 },
    TilePlayed { player_id: String, tile: (u8, u8), side: Side, auto_played: bool },
    TurnPassed { player_id: String, auto_passed: bool },
    TileClaimed { player_id: String, position: u8 },
    TilesAutoAssigned { player_id: String, positions: Vec<u8>, reason: String },
    CpuAdded { player_id: String, name: String },
    RoundOver {
        round_number: u32,
        winner_id: String,
        winner_name: String,
        winner_team: Option<u8>,
        points_awarded: i32,
        remaining_pips: HashMap<String, u32>,
        was_blocked: bool,
        scores: ScoreSnapshot,
        match_winner: Option<String>,
        is_team_game: bool,
    },
    MatchOver { winner: String, is_team_game: bool, final_scores: ScoreSnapshot, total_rounds: u32 },
    /// Emitted instead of `round_over`/`match_over` when the game has no
    /// associated match (a single standalone round with no target score).
    GameOver { winner_id: String, winner_name: String },
    Reaction { player_id: String, emoji: String },
    PlayerJoined { player_id: String, name: String },
    PlayerLeft { player_id: String },
    Error { code: String, message: String },
}
