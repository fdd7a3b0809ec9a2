//! Per-player sanitized state views. Every broadcast goes through here so
//! a connected client only ever sees its own hand; everyone else's tiles
//! are reported as a count.

use std::time::Instant;

use serde::Serialize;

use super::board::{BoardEnds, PlayedTile};
use super::match_state::Match;
use super::state::{Game, GameStatus, Variant};
use super::tile::Tile;

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub id: String,
    pub name: String,
    pub is_cpu: bool,
    pub connected: bool,
    pub score: i32,
    pub hand_size: usize,
    pub seat_index: usize,
    pub is_you: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: String,
    pub team_a: Option<Vec<String>>,
    pub team_b: Option<Vec<String>>,
    pub team_scores: std::collections::HashMap<u8, i32>,
    pub individual_scores: std::collections::HashMap<String, i32>,
    pub target_score: i32,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub game_id: String,
    pub variant: Variant,
    pub status: GameStatus,
    pub you: String,
    pub your_hand: Vec<Tile>,
    pub your_turn: bool,
    pub creator_id: Option<String>,
    pub seats: Vec<SeatView>,
    pub board: Vec<PlayedTile>,
    pub ends: BoardEnds,
    pub boneyard_remaining: usize,
    pub picking_remaining: usize,
    /// Grid positions still face-down during picking (tiles withheld).
    pub picking_positions: Vec<u8>,
    pub current_turn: Option<String>,
    pub round_number: u32,
    pub winner_id: Option<String>,
    /// Seconds left before the turn-timeout sweep forces a play/pass, while
    /// the game is playing.
    pub turn_seconds_remaining: Option<u64>,
    /// Seconds left before the picking-timeout sweep auto-assigns tiles,
    /// while the game is picking.
    pub picking_seconds_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mat: Option<MatchView>,
}

fn seconds_remaining(started_at: Option<Instant>, timeout: u64) -> Option<u64> {
    started_at.map(|started| timeout.saturating_sub(started.elapsed().as_secs()))
}

pub fn build_player_view(game: &Game, player_id: &str, amatch: Option<&Match>) -> PlayerView {
    let seats = game
        .players
        .iter()
        .enumerate()
        .map(|(seat_index, p)| SeatView {
            id: p.id.clone(),
            name: p.name.clone(),
            is_cpu: p.is_cpu,
            connected: p.connected,
            score: p.score,
            hand_size: p.hand.len(),
            seat_index,
            is_you: p.id == player_id,
        })
        .collect();

    let your_hand = game
        .get_player(player_id)
        .map(|p| p.hand.clone())
        .unwrap_or_default();

    let mut picking_positions: Vec<u8> = game.picking_tiles.keys().copied().collect();
    picking_positions.sort_unstable();

    PlayerView {
        game_id: game.id.clone(),
        variant: game.variant,
        status: game.status,
        you: player_id.to_string(),
        your_hand,
        your_turn: game.current_turn.as_deref() == Some(player_id),
        creator_id: game.creator_id().map(str::to_string),
        seats,
        board: game.board.clone(),
        ends: game.ends,
        boneyard_remaining: game.boneyard.len(),
        picking_remaining: game.picking_tiles.len(),
        picking_positions,
        current_turn: game.current_turn.clone(),
        round_number: game.round_number,
        winner_id: game.winner_id.clone(),
        turn_seconds_remaining: seconds_remaining(game.turn_started_at, game.turn_timeout),
        picking_seconds_remaining: seconds_remaining(game.picking_started_at, game.picking_timeout),
        mat: amatch.map(|m| MatchView {
            id: m.id.clone(),
            team_a: m.team_a.clone(),
            team_b: m.team_b.clone(),
            team_scores: m.team_scores.clone(),
            individual_scores: m.individual_scores.clone(),
            target_score: m.target_score,
            winner: m.get_winner(),
        }),
    }
}
