//! Move legality, placement orientation, and turn/round progression.

use serde::{Deserialize, Serialize};

use super::board::{next_position, BoardEnds, PlayedTile};
use super::state::{advance_turn, Game, GameStatus};
use super::tile::Tile;
use crate::error::{AuthorizationError, GameError, StateError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Every `(tile, side)` pair in `hand` that can legally be played against
/// `ends`. An empty board accepts any tile, always reported as `Left`
/// (there is no meaningful second side to distinguish yet). When the two
/// ends hold equal pip values, `Right` is suppressed so the same physical
/// move is never reported twice.
pub fn legal_moves(hand: &[Tile], ends: BoardEnds) -> Vec<(Tile, Side)> {
    if ends.is_empty() {
        return hand.iter().map(|t| (*t, Side::Left)).collect();
    }

    let mut moves = Vec::new();
    for tile in hand {
        if let Some(left) = ends.left {
            if tile.left == left || tile.right == left {
                moves.push((*tile, Side::Left));
            }
        }
        if let Some(right) = ends.right {
            if ends.left == ends.right {
                continue;
            }
            if tile.left == right || tile.right == right {
                moves.push((*tile, Side::Right));
            }
        }
    }
    moves
}

/// The tile's placed orientation and the resulting board ends, for playing
/// `tile` against `side` of `ends`. Caller must have already established
/// the move is legal; an empty board always yields `tile` as given.
fn compute_placement(tile: Tile, side: Side, ends: BoardEnds) -> (Tile, BoardEnds) {
    if ends.is_empty() {
        return (
            tile,
            BoardEnds {
                left: Some(tile.left),
                right: Some(tile.right),
            },
        );
    }

    match side {
        Side::Left => {
            let matched = ends.left.expect("legal_moves only offers Left when ends.left is set");
            let placed = if tile.right == matched { tile } else { tile.flipped() };
            (placed, BoardEnds { left: Some(placed.left), right: ends.right })
        }
        Side::Right => {
            let matched = ends.right.expect("legal_moves only offers Right when ends.right is set");
            let placed = if tile.left == matched { tile } else { tile.flipped() };
            (placed, BoardEnds { left: ends.left, right: Some(placed.right) })
        }
    }
}

pub fn play_tile(
    game: &mut Game,
    player_id: &str,
    tile: Tile,
    side: Side,
) -> Result<(), GameError> {
    if game.status != GameStatus::Playing {
        return Err(StateError::NotPlaying.into());
    }
    if game.current_turn.as_deref() != Some(player_id) {
        return Err(AuthorizationError::NotYourTurn.into());
    }

    let hand_pos = {
        let player = game.get_player(player_id).ok_or(StateError::PlayerNotFound)?;
        player
            .hand
            .iter()
            .position(|t| *t == tile)
            .ok_or(StateError::TileNotInHand)?
    };

    let offered = legal_moves(&game.get_player(player_id).unwrap().hand, game.ends);
    if !offered.iter().any(|(t, s)| *t == tile && *s == side) {
        return Err(StateError::EndMismatch.into());
    }

    let (placed, new_ends) = compute_placement(tile, side, game.ends);
    let position = next_position(&game.board);

    let player = game.get_player_mut(player_id).unwrap();
    player.hand.remove(hand_pos);

    match side {
        Side::Left if !game.ends.is_empty() => game.board.insert(0, PlayedTile { tile: placed, position }),
        _ => game.board.push(PlayedTile { tile: placed, position }),
    }
    game.ends = new_ends;
    game.touch();

    advance_turn(game);
    Ok(())
}

pub fn pass_turn(game: &mut Game, player_id: &str) -> Result<(), GameError> {
    if game.status != GameStatus::Playing {
        return Err(StateError::NotPlaying.into());
    }
    if game.current_turn.as_deref() != Some(player_id) {
        return Err(AuthorizationError::NotYourTurn.into());
    }

    let player = game.get_player(player_id).ok_or(StateError::PlayerNotFound)?;
    if !legal_moves(&player.hand, game.ends).is_empty() {
        return Err(AuthorizationError::MoveAvailable.into());
    }

    game.touch();
    advance_turn(game);
    Ok(())
}

/// Returns `(winner_id, was_blocked)` once the round is over: a player has
/// emptied their hand (domino), or no player holds a legal move (blocked,
/// resolved by lowest hand total, ties broken by seat order).
pub fn check_round_over(game: &Game) -> Option<(String, bool)> {
    if let Some(domino) = game.players.iter().find(|p| p.hand.is_empty()) {
        return Some((domino.id.clone(), false));
    }

    let anyone_can_move = game
        .players
        .iter()
        .any(|p| !legal_moves(&p.hand, game.ends).is_empty());
    if anyone_can_move {
        return None;
    }

    game.players
        .iter()
        .min_by_key(|p| p.hand_total())
        .map(|p| (p.id.clone(), true))
}

pub fn validate_side(raw: &str) -> Result<Side, GameError> {
    match raw {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        _ => Err(ValidationError::InvalidSide.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Player;
    use crate::game::state::Variant;

    fn game_with(hands: Vec<Vec<Tile>>) -> Game {
        let mut game = Game::new("g".into(), Variant::Block, 4, 45, 30);
        for (i, hand) in hands.into_iter().enumerate() {
            let mut p = Player::new(format!("p{i}"), format!("P{i}"), false);
            p.hand = hand;
            game.players.push(p);
        }
        game.status = GameStatus::Playing;
        game.current_turn = Some("p0".into());
        game
    }

    #[test]
    fn empty_board_accepts_any_tile_as_left() {
        let hand = vec![Tile::new(1, 2), Tile::new(3, 3)];
        let moves = legal_moves(&hand, BoardEnds::default());
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|(_, s)| *s == Side::Left));
    }

    #[test]
    fn right_suppressed_when_ends_equal() {
        let ends = BoardEnds { left: Some(4), right: Some(4) };
        let hand = vec![Tile::new(4, 2)];
        let moves = legal_moves(&hand, ends);
        assert_eq!(moves, vec![(Tile::new(4, 2), Side::Left)]);
    }

    #[test]
    fn scenario_four_from_spec_worked_example() {
        // ends=(3,5): play {5,2} right -> placed (5,2), new ends (3,2).
        let ends = BoardEnds { left: Some(3), right: Some(5) };
        let (placed, new_ends) = compute_placement(Tile::new(2, 5), Side::Right, ends);
        assert_eq!((placed.left, placed.right), (5, 2));
        assert_eq!(new_ends, BoardEnds { left: Some(3), right: Some(2) });

        // then play {3,6} left -> placed (6,3), new ends (6,2).
        let (placed2, new_ends2) = compute_placement(Tile::new(3, 6), Side::Left, new_ends);
        assert_eq!((placed2.left, placed2.right), (6, 3));
        assert_eq!(new_ends2, BoardEnds { left: Some(6), right: Some(2) });
    }

    #[test]
    fn play_tile_rejects_out_of_turn() {
        let mut game = game_with(vec![vec![Tile::new(1, 1)], vec![Tile::new(2, 2)]]);
        game.current_turn = Some("p1".into());
        let err = play_tile(&mut game, "p0", Tile::new(1, 1), Side::Left).unwrap_err();
        assert_eq!(err.code(), "not_your_turn");
    }

    #[test]
    fn play_tile_rejects_tile_not_in_hand() {
        let mut game = game_with(vec![vec![Tile::new(1, 1)], vec![Tile::new(2, 2)]]);
        let err = play_tile(&mut game, "p0", Tile::new(5, 6), Side::Left).unwrap_err();
        assert_eq!(err.code(), "tile_not_in_hand");
    }

    #[test]
    fn play_tile_advances_turn_and_updates_board() {
        let mut game = game_with(vec![vec![Tile::new(1, 1)], vec![Tile::new(1, 2)]]);
        play_tile(&mut game, "p0", Tile::new(1, 1), Side::Left).unwrap();
        assert_eq!(game.board.len(), 1);
        assert_eq!(game.ends, BoardEnds { left: Some(1), right: Some(1) });
        assert_eq!(game.current_turn.as_deref(), Some("p1"));
        assert!(game.players[0].hand.is_empty());
    }

    #[test]
    fn pass_turn_rejected_when_move_available() {
        let mut game = game_with(vec![vec![Tile::new(1, 1)], vec![Tile::new(2, 2)]]);
        game.ends = BoardEnds { left: Some(1), right: Some(3) };
        let err = pass_turn(&mut game, "p0").unwrap_err();
        assert_eq!(err.code(), "move_available");
    }

    #[test]
    fn pass_turn_allowed_when_blocked() {
        let mut game = game_with(vec![vec![Tile::new(2, 2)], vec![Tile::new(3, 3)]]);
        game.ends = BoardEnds { left: Some(6), right: Some(6) };
        assert!(pass_turn(&mut game, "p0").is_ok());
        assert_eq!(game.current_turn.as_deref(), Some("p1"));
    }

    #[test]
    fn round_over_by_domino() {
        let game = game_with(vec![vec![], vec![Tile::new(2, 2)]]);
        let (winner, blocked) = check_round_over(&game).unwrap();
        assert_eq!(winner, "p0");
        assert!(!blocked);
    }

    #[test]
    fn round_over_by_block_lowest_total_wins() {
        let mut game = game_with(vec![
            vec![Tile::new(6, 6)],
            vec![Tile::new(5, 5)],
            vec![Tile::new(5, 4)],
        ]);
        game.ends = BoardEnds { left: Some(0), right: Some(0) };
        let (winner, blocked) = check_round_over(&game).unwrap();
        assert_eq!(winner, "p2");
        assert!(blocked);
    }

    #[test]
    fn round_over_by_block_ties_break_by_seat_order() {
        let mut game = game_with(vec![
            vec![Tile::new(3, 3)],
            vec![Tile::new(2, 4)],
            vec![Tile::new(6, 6)],
        ]);
        game.ends = BoardEnds { left: Some(0), right: Some(0) };
        let (winner, blocked) = check_round_over(&game).unwrap();
        assert_eq!(winner, "p0");
        assert!(blocked);
    }
}
