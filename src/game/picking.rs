//! The picking phase: every player (including CPUs) concurrently claims
//! tiles one at a time from a shared face-down grid until every hand holds
//! `HAND_SIZE` tiles.

use std::collections::HashMap;

use super::state::{try_begin_play, Game, GameStatus, HAND_SIZE};
use crate::error::{GameError, StateError};
use crate::rng::RandomSource;

/// A human claims `position` from the picking grid. Fails if the game
/// isn't picking, the slot is already taken, or the player's hand is full.
pub fn claim_tile(game: &mut Game, player_id: &str, position: u8) -> Result<(), GameError> {
    if game.status != GameStatus::Picking {
        return Err(StateError::NotPicking.into());
    }
    let player = game.get_player(player_id).ok_or(StateError::PlayerNotFound)?;
    if player.hand.len() >= HAND_SIZE {
        return Err(StateError::HandFull.into());
    }
    let tile = game
        .picking_tiles
        .remove(&position)
        .ok_or(StateError::PositionTaken)?;

    game.get_player_mut(player_id).unwrap().hand.push(tile);
    game.touch();
    try_begin_play(game, None);
    Ok(())
}

/// A CPU seat claims a uniformly random open slot. Returns the claimed
/// position, or `None` with no effect if the CPU's hand is already full or
/// none remain (caller stops the picking worker in that case).
pub fn cpu_claim_tile(game: &mut Game, player_id: &str, rng: &dyn RandomSource) -> Option<u8> {
    if game.status != GameStatus::Picking {
        return None;
    }
    let player = game.get_player(player_id)?;
    if player.hand.len() >= HAND_SIZE || game.picking_tiles.is_empty() {
        return None;
    }

    let mut positions: Vec<u8> = game.picking_tiles.keys().copied().collect();
    positions.sort_unstable();
    let idx = rng.gen_index(positions.len());
    let position = positions[idx];
    let tile = game.picking_tiles.remove(&position).expect("position just listed from the map");

    game.get_player_mut(player_id).unwrap().hand.push(tile);
    game.touch();
    try_begin_play(game, None);
    Some(position)
}

/// Called by the picking-timeout sweep: deals whatever tiles remain
/// face-down, in grid order, to whichever *human* hands are still short
/// (CPU seats are expected to have finished claiming on their own), so a
/// stalled picking phase can never hang the game forever. Returns the
/// positions assigned to each affected player, for event emission by the
/// caller.
pub fn auto_assign_remaining_tiles(game: &mut Game) -> Vec<(String, Vec<u8>)> {
    if game.status != GameStatus::Picking {
        return Vec::new();
    }
    let mut positions: Vec<u8> = game.picking_tiles.keys().copied().collect();
    positions.sort_unstable();
    let mut positions = positions.into_iter();

    let short_ids: Vec<String> = game
        .players
        .iter()
        .filter(|p| !p.is_cpu && p.hand.len() < HAND_SIZE)
        .map(|p| p.id.clone())
        .collect();

    let mut assigned: HashMap<String, Vec<u8>> = HashMap::new();
    'deal: loop {
        let mut progressed = false;
        for player_id in &short_ids {
            if game.get_player(player_id).map(|p| p.hand.len()).unwrap_or(HAND_SIZE) >= HAND_SIZE {
                continue;
            }
            let Some(position) = positions.next() else { break 'deal };
            let tile = game.picking_tiles.remove(&position).expect("position just listed from the map");
            game.get_player_mut(player_id).unwrap().hand.push(tile);
            assigned.entry(player_id.clone()).or_default().push(position);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    game.touch();
    try_begin_play(game, None);
    assigned.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Player;
    use crate::game::state::{start_picking, Variant};
    use crate::rng::StdRandomSource;

    fn picking_game(n: usize) -> Game {
        let mut game = Game::new("g".into(), Variant::Block, 4, 45, 30);
        for i in 0..n {
            game.players.push(Player::new(format!("p{i}"), format!("P{i}"), false));
        }
        let rng = StdRandomSource::seeded(1, true);
        start_picking(&mut game, &rng);
        game
    }

    #[test]
    fn claim_moves_tile_from_grid_to_hand() {
        let mut game = picking_game(2);
        let position = *game.picking_tiles.keys().next().unwrap();
        claim_tile(&mut game, "p0", position).unwrap();
        assert_eq!(game.players[0].hand.len(), 1);
        assert!(!game.picking_tiles.contains_key(&position));
    }

    #[test]
    fn claim_rejects_already_taken_position() {
        let mut game = picking_game(2);
        let position = *game.picking_tiles.keys().next().unwrap();
        claim_tile(&mut game, "p0", position).unwrap();
        let err = claim_tile(&mut game, "p1", position).unwrap_err();
        assert_eq!(err.code(), "position_taken");
    }

    #[test]
    fn claim_rejects_full_hand() {
        let mut game = picking_game(2);
        let positions: Vec<u8> = game.picking_tiles.keys().take(HAND_SIZE).copied().collect();
        for p in positions {
            claim_tile(&mut game, "p0", p).unwrap();
        }
        let extra = *game.picking_tiles.keys().next().unwrap();
        let err = claim_tile(&mut game, "p0", extra).unwrap_err();
        assert_eq!(err.code(), "hand_full");
    }

    #[test]
    fn filling_all_hands_transitions_to_playing() {
        let mut game = picking_game(2);
        let rng = StdRandomSource::seeded(7, true);
        while game.status == GameStatus::Picking {
            let alive: Vec<String> = game
                .players
                .iter()
                .filter(|p| p.hand.len() < HAND_SIZE)
                .map(|p| p.id.clone())
                .collect();
            for id in alive {
                cpu_claim_tile(&mut game, &id, &rng);
            }
        }
        assert_eq!(game.status, GameStatus::Playing);
        assert!(game.players.iter().all(|p| p.hand.len() == HAND_SIZE));
    }

    #[test]
    fn auto_assign_fills_short_hands_and_begins_play() {
        let mut game = picking_game(2);
        let assigned = auto_assign_remaining_tiles(&mut game);
        assert!(game.players.iter().all(|p| p.hand.len() == HAND_SIZE));
        assert_eq!(game.status, GameStatus::Playing);
        let total_assigned: usize = assigned.iter().map(|(_, positions)| positions.len()).sum();
        assert_eq!(total_assigned, HAND_SIZE * 2);
    }

    #[test]
    fn auto_assign_skips_cpu_seats() {
        let mut game = Game::new("g".into(), Variant::Block, 2, 45, 30);
        game.players.push(Player::new("p0", "P0", false));
        game.players.push(Player::new("p1", "P1", true));
        let rng = StdRandomSource::seeded(1, true);
        start_picking(&mut game, &rng);

        let assigned = auto_assign_remaining_tiles(&mut game);
        assert_eq!(game.players[0].hand.len(), HAND_SIZE);
        assert_eq!(game.players[1].hand.len(), 0);
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].0, "p0");
    }
}
