//! Round scoring: points awarded to the round's winner from the losers'
//! remaining hands, free-for-all or team-pooled.

use std::collections::HashMap;

use super::state::Game;

/// Free-for-all. A domino'd round pays the winner the full sum of every
/// other hand. A blocked round (the winner still holds tiles, chosen by
/// lowest hand total) subtracts the winner's own remaining pips and clamps
/// at zero, so a narrow win on a near-tied blocked board doesn't overpay.
pub fn free_for_all_points(game: &Game, winner_id: &str, was_blocked: bool) -> i32 {
    let opponents: i32 = game
        .players
        .iter()
        .filter(|p| p.id != winner_id)
        .map(|p| p.hand_total() as i32)
        .sum();
    if !was_blocked {
        return opponents;
    }
    let winner_pips = game.get_player(winner_id).map(|p| p.hand_total() as i32).unwrap_or(0);
    (opponents - winner_pips).max(0)
}

/// 2v2. `team_of` maps player id to team index (0 or 1). A domino'd round
/// pays the winning team the opposing team's full hand sum. A blocked round
/// subtracts the winning team's own remaining pips and clamps at zero.
pub fn team_points(game: &Game, winner_id: &str, team_of: &HashMap<String, u8>, was_blocked: bool) -> i32 {
    let Some(winning_team) = team_of.get(winner_id) else {
        return 0;
    };
    let opposing: i32 = game
        .players
        .iter()
        .filter(|p| team_of.get(&p.id) != Some(winning_team))
        .map(|p| p.hand_total() as i32)
        .sum();
    if !was_blocked {
        return opposing;
    }
    let own: i32 = game
        .players
        .iter()
        .filter(|p| team_of.get(&p.id) == Some(winning_team))
        .map(|p| p.hand_total() as i32)
        .sum();
    (opposing - own).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Player;
    use crate::game::state::Variant;
    use crate::game::tile::Tile;

    fn game_with(hands: Vec<Vec<Tile>>) -> Game {
        let mut game = Game::new("g".into(), Variant::Block, 4, 45, 30);
        for (i, hand) in hands.into_iter().enumerate() {
            let mut p = Player::new(format!("p{i}"), format!("P{i}"), false);
            p.hand = hand;
            game.players.push(p);
        }
        game
    }

    #[test]
    fn free_for_all_domino_pays_full_opponent_sum() {
        let game = game_with(vec![
            vec![],
            vec![Tile::new(6, 6)],
            vec![Tile::new(5, 4)],
        ]);
        assert_eq!(free_for_all_points(&game, "p0", false), 12 + 9);
    }

    #[test]
    fn free_for_all_blocked_subtracts_winner_pips_and_clamps() {
        let game = game_with(vec![
            vec![Tile::new(6, 6)],
            vec![Tile::new(5, 5)],
            vec![Tile::new(5, 4)],
        ]);
        // p2 holds the lowest total (9) and wins the blocked round.
        assert_eq!(free_for_all_points(&game, "p2", true), 12 + 10 - 9);
    }

    #[test]
    fn free_for_all_blocked_clamps_at_zero() {
        let game = game_with(vec![
            vec![Tile::new(1, 1)],
            vec![Tile::new(1, 2)],
            vec![Tile::new(6, 6), Tile::new(6, 5)],
        ]);
        // p0 has the lowest total (2) but opponents only total 3+23, so a
        // contrived case with a heavy winner hand would clamp; here we flip
        // it: winner p2 has the highest hand and should clamp to zero.
        assert_eq!(free_for_all_points(&game, "p2", true), 0);
    }

    #[test]
    fn team_points_domino_pays_full_opposing_sum() {
        let game = game_with(vec![
            vec![],
            vec![Tile::new(6, 6)],
            vec![Tile::new(5, 4)],
            vec![Tile::new(1, 1)],
        ]);
        let mut team_of = HashMap::new();
        team_of.insert("p0".to_string(), 0);
        team_of.insert("p1".to_string(), 1);
        team_of.insert("p2".to_string(), 0);
        team_of.insert("p3".to_string(), 1);
        assert_eq!(team_points(&game, "p0", &team_of, false), 12 + 2);
    }

    #[test]
    fn team_points_blocked_subtracts_own_team_pips() {
        let game = game_with(vec![
            vec![Tile::new(5, 4)],
            vec![Tile::new(6, 6)],
            vec![Tile::new(1, 1)],
            vec![Tile::new(1, 2)],
        ]);
        let mut team_of = HashMap::new();
        team_of.insert("p0".to_string(), 0);
        team_of.insert("p1".to_string(), 1);
        team_of.insert("p2".to_string(), 0);
        team_of.insert("p3".to_string(), 1);
        // p0 (team 0, 9 pips) wins a blocked round; team 0 also holds p2's
        // 2 pips. Opposing team (p1+p3) totals 12+3=15; own team totals
        // 9+2=11; points = 15-11 = 4.
        assert_eq!(team_points(&game, "p0", &team_of, true), 4);
    }
}
