//! Client frame dispatch. Pure functions over a single `GameRecord`; the
//! transport layer owns the lock and fans the returned effects out to
//! connected sockets.

use std::collections::HashMap;

use crate::error::{AuthorizationError, GameError, StateError};
use crate::game::{
    self, build_player_view, check_round_over, pass_turn, play_tile, scoring, start_new_round,
    start_picking, try_begin_play, Game, GameStatus, Match, PlayerView, Side, Tile,
};
use crate::rng::RandomSource;
use crate::transport::protocol::{ScoreSnapshot, ServerEvent};

use super::registry::GameRecord;

/// What happened as a result of one client frame, for the transport layer
/// to turn into outbound frames. `state_changed` tells the caller a fresh
/// per-player `GameState` broadcast is owed; the others are one-shot
/// events layered on top.
pub struct DispatchOutcome {
    pub state_changed: bool,
    pub extra: Vec<ServerEvent>,
    pub reply_only: Vec<ServerEvent>,
}

impl DispatchOutcome {
    fn state_only() -> Self {
        Self { state_changed: true, extra: Vec::new(), reply_only: Vec::new() }
    }

    fn none() -> Self {
        Self { state_changed: false, extra: Vec::new(), reply_only: Vec::new() }
    }
}

/// Builds the `tile_played` event for a play, human or CPU-driven. `cpu_driver`
/// and `timers::turn_timeout_sweep` call this directly since they mutate the
/// game via `game::play_tile` without going through a `handle_*` function.
pub fn tile_played_event(player_id: &str, tile: Tile, side: Side, auto_played: bool) -> ServerEvent {
    ServerEvent::TilePlayed {
        player_id: player_id.to_string(),
        tile: (tile.left, tile.right),
        side,
        auto_played,
    }
}

/// Builds the `turn_passed` event; see [`tile_played_event`] for why callers
/// outside this module need it directly.
pub fn turn_passed_event(player_id: &str, auto_passed: bool) -> ServerEvent {
    ServerEvent::TurnPassed { player_id: player_id.to_string(), auto_passed }
}

/// `Some(round_started)` if the picking-to-playing transition just happened;
/// used by every caller that can trigger it (claim, cpu claim, auto-assign).
fn round_started_if_transitioned(before: GameStatus, game: &Game) -> Option<ServerEvent> {
    if before == GameStatus::Picking && game.status == GameStatus::Playing {
        Some(ServerEvent::RoundStarted { round_number: game.round_number })
    } else {
        None
    }
}

pub fn handle_play_tile(
    record: &mut GameRecord,
    player_id: &str,
    raw_tile: (u8, u8),
    side: Side,
) -> Result<DispatchOutcome, GameError> {
    let tile = Tile::new(raw_tile.0, raw_tile.1);
    play_tile(&mut record.game, player_id, tile, side)?;
    let mut outcome = DispatchOutcome::state_only();
    outcome.extra.push(tile_played_event(player_id, tile, side, false));
    if let Some(event) = settle_round_if_over(record) {
        outcome.extra.push(event);
    }
    Ok(outcome)
}

pub fn handle_pass_turn(record: &mut GameRecord, player_id: &str) -> Result<DispatchOutcome, GameError> {
    pass_turn(&mut record.game, player_id)?;
    let mut outcome = DispatchOutcome::state_only();
    outcome.extra.push(turn_passed_event(player_id, false));
    if let Some(event) = settle_round_if_over(record) {
        outcome.extra.push(event);
    }
    Ok(outcome)
}

pub fn handle_claim_tile(record: &mut GameRecord, player_id: &str, position: u8) -> Result<DispatchOutcome, GameError> {
    let before = record.game.status;
    game::picking::claim_tile(&mut record.game, player_id, position)?;
    let mut outcome = DispatchOutcome::state_only();
    outcome.extra.push(ServerEvent::TileClaimed { player_id: player_id.to_string(), position });
    if let Some(event) = round_started_if_transitioned(before, &record.game) {
        outcome.extra.push(event);
    }
    Ok(outcome)
}

pub fn handle_get_valid_moves(record: &GameRecord, player_id: &str) -> Result<DispatchOutcome, GameError> {
    if record.game.status != GameStatus::Playing {
        return Err(StateError::NotPlaying.into());
    }
    let player = record.game.get_player(player_id).ok_or(StateError::PlayerNotFound)?;
    let moves = game::legal_moves(&player.hand, record.game.ends)
        .into_iter()
        .map(|(t, s)| ((t.left, t.right), s))
        .collect();
    let mut outcome = DispatchOutcome::none();
    outcome.reply_only.push(ServerEvent::ValidMoves { moves });
    Ok(outcome)
}

pub fn handle_start_game(record: &mut GameRecord, player_id: &str, rng: &dyn RandomSource) -> Result<DispatchOutcome, GameError> {
    if record.game.creator_id() != Some(player_id) {
        return Err(AuthorizationError::CreatorOnly.into());
    }
    if record.game.status != GameStatus::Waiting {
        return Err(StateError::GameInProgress.into());
    }
    if record.game.players.len() < 2 {
        return Err(StateError::NotEnoughPlayers.into());
    }
    start_picking(&mut record.game, rng);
    let mut outcome = DispatchOutcome::state_only();
    outcome.extra.push(ServerEvent::GameStarted);
    Ok(outcome)
}

pub fn handle_add_cpu(record: &mut GameRecord, player_id: &str, rng: &dyn RandomSource) -> Result<DispatchOutcome, GameError> {
    if record.game.creator_id() != Some(player_id) {
        return Err(AuthorizationError::CreatorOnly.into());
    }
    if record.game.status != GameStatus::Waiting {
        return Err(StateError::GameInProgress.into());
    }
    if record.game.is_full() {
        return Err(StateError::GameFull.into());
    }
    let taken: Vec<String> = record.game.players.iter().map(|p| p.name.clone()).collect();
    let name = game::cpu::pick_cpu_name(&taken, rng);
    let id = format!("cpu-{}", uuid::Uuid::new_v4());
    record.game.players.push(game::Player::new(id.clone(), name.clone(), true));
    let mut outcome = DispatchOutcome::state_only();
    outcome.extra.push(ServerEvent::CpuAdded { player_id: id, name });
    Ok(outcome)
}

pub fn handle_reaction(player_id: &str, emoji: String) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::none();
    outcome.extra.push(ServerEvent::Reaction { player_id: player_id.to_string(), emoji });
    outcome
}

pub fn handle_next_round(record: &mut GameRecord, player_id: &str) -> Result<DispatchOutcome, GameError> {
    if record.game.creator_id() != Some(player_id) {
        return Err(AuthorizationError::CreatorOnly.into());
    }
    if record.game.status != GameStatus::Finished {
        return Err(StateError::RoundNotFinished.into());
    }
    if let Some(m) = &record.match_data {
        if m.is_over() {
            return Err(StateError::MatchOver.into());
        }
    }

    let previous_winner = record.game.winner_id.clone();
    record.game.round_number += 1;
    start_new_round(&mut record.game);
    let all_picked: HashMap<u8, Tile> = Tile::full_set().into_iter().enumerate().map(|(i, t)| (i as u8, t)).collect();
    record.game.picking_tiles = all_picked;
    record.game.status = GameStatus::Picking;
    record.game.picking_started_at = Some(std::time::Instant::now());
    let _ = try_begin_play(&mut record.game, previous_winner);
    Ok(DispatchOutcome::state_only())
}

fn score_snapshot(m: &Match) -> ScoreSnapshot {
    ScoreSnapshot { individual: m.individual_scores.clone(), team: m.team_scores.clone() }
}

/// After any move that could end the round, checks, scores, records into
/// the match (if any), and reports the matching round-over/match-over/
/// game-over event. A game with no match (a standalone round) reports
/// `game_over` instead of `round_over`, since there's no further round to
/// advance to.
pub fn settle_round_if_over(record: &mut GameRecord) -> Option<ServerEvent> {
    let (winner_id, was_blocked) = check_round_over(&record.game)?;

    let is_team = record.match_data.as_ref().is_some_and(|m| m.is_team_match());
    let team_of: HashMap<String, u8> = record
        .match_data
        .as_ref()
        .map(|m| {
            record
                .game
                .players
                .iter()
                .filter_map(|p| m.team_for_player(&p.id).map(|t| (p.id.clone(), t)))
                .collect()
        })
        .unwrap_or_default();

    let remaining_pips: HashMap<String, u32> = record.game.players.iter().map(|p| (p.id.clone(), p.hand_total())).collect();

    let points = if is_team {
        scoring::team_points(&record.game, &winner_id, &team_of, was_blocked)
    } else {
        scoring::free_for_all_points(&record.game, &winner_id, was_blocked)
    };

    let winner_name = record.game.get_player(&winner_id).map(|p| p.name.clone()).unwrap_or_default();
    let winner_team = team_of.get(&winner_id).copied();
    let round_number = record.game.round_number;

    game::finish_round(&mut record.game, winner_id.clone());

    let Some(m) = &mut record.match_data else {
        return Some(ServerEvent::GameOver { winner_id, winner_name });
    };

    m.record_round(round_number, &winner_id, was_blocked, points);
    let is_team_game = m.is_team_match();

    if let Some(match_winner) = m.get_winner() {
        return Some(ServerEvent::MatchOver {
            winner: match_winner,
            is_team_game,
            final_scores: score_snapshot(m),
            total_rounds: m.rounds.len() as u32,
        });
    }

    Some(ServerEvent::RoundOver {
        round_number,
        winner_id,
        winner_name,
        winner_team,
        points_awarded: points,
        remaining_pips,
        was_blocked,
        scores: score_snapshot(m),
        match_winner: m.get_winner(),
        is_team_game,
    })
}

pub fn views_for_all(record: &Game, match_data: Option<&Match>) -> Vec<(String, PlayerView)> {
    record
        .players
        .iter()
        .map(|p| (p.id.clone(), build_player_view(record, &p.id, match_data)))
        .collect()
}
