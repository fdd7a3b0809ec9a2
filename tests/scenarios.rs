//! End-to-end scenario tests driving the rules engine and dispatch layer
//! together, independent of the network transport.

use dominoes_engine::game::{
    self, check_round_over, pass_turn, play_tile, start_new_round, start_picking, Game,
    GameStatus, Match, Player, Side, Tile, Variant,
};
use dominoes_engine::rng::StdRandomSource;
use dominoes_engine::services::dispatch::{handle_add_cpu, handle_start_game, settle_round_if_over};
use dominoes_engine::services::registry::GameRecord;

/// Directly seeds hands and starts play, bypassing `try_begin_play`'s
/// full-hand check so scenarios can use small, easy-to-read hands instead
/// of a full six-tile deal.
fn deal_fixed(game: &mut Game, hands: Vec<Vec<Tile>>) {
    let starter = game.players[0].id.clone();
    for (player, hand) in game.players.iter_mut().zip(hands) {
        player.hand = hand;
    }
    game.status = GameStatus::Playing;
    game.current_turn = Some(starter);
}

/// A four-player game runs from waiting through a full hand-emptying
/// round, the winner is scored, and the match records it.
#[test]
fn full_round_free_for_all_domino_win() {
    let mut game = Game::new("g1".into(), Variant::Block, 4, 45, 30);
    for i in 0..4 {
        game.players.push(Player::new(format!("p{i}"), format!("P{i}"), false));
    }

    deal_fixed(
        &mut game,
        vec![
            vec![Tile::new(1, 1)],
            vec![Tile::new(3, 3)],
            vec![Tile::new(4, 4)],
            vec![Tile::new(5, 5)],
        ],
    );

    let starter = game.current_turn.clone().unwrap();
    let mut record = GameRecord { game, match_data: Some(Match::new_free_for_all("m1".into(), "g1".into(), &["p0", "p1", "p2", "p3"].map(String::from), 150)), cpu_turn_active: false, cpu_picking_active: false };

    play_tile(&mut record.game, &starter, Tile::new(1, 1), Side::Left).unwrap();

    assert!(record.game.players.iter().find(|p| p.id == starter).unwrap().hand.is_empty());
    let event = settle_round_if_over(&mut record);
    assert!(event.is_some());
    assert_eq!(record.game.status, GameStatus::Finished);
    assert_eq!(record.game.winner_id.as_deref(), Some(starter.as_str()));

    let m = record.match_data.as_ref().unwrap();
    assert_eq!(m.individual_scores[&starter], 6 + 8 + 10);
}

/// A blocked round (nobody can move) resolves by lowest hand total with
/// seat-order tie-breaking, exactly as `check_round_over` documents.
#[test]
fn blocked_round_resolves_by_lowest_hand_total() {
    let mut game = Game::new("g2".into(), Variant::Block, 3, 45, 30);
    for i in 0..3 {
        game.players.push(Player::new(format!("p{i}"), format!("P{i}"), false));
    }
    game.status = GameStatus::Playing;
    game.ends = game::BoardEnds { left: Some(0), right: Some(0) };
    game.players[0].hand = vec![Tile::new(6, 6)];
    game.players[1].hand = vec![Tile::new(5, 4)];
    game.players[2].hand = vec![Tile::new(3, 1)];

    let (winner, was_blocked) = check_round_over(&game).unwrap();
    assert!(was_blocked);
    assert_eq!(winner, "p2");
}

/// The picking phase only lets play begin once every hand is full, and it
/// never leaves a slot double-claimed.
#[test]
fn picking_phase_fills_every_hand_exactly_once() {
    let mut game = Game::new("g3".into(), Variant::Block, 2, 45, 30);
    game.players.push(Player::new("p0".into(), "A".into(), false));
    game.players.push(Player::new("p1".into(), "B".into(), false));
    let rng = StdRandomSource::seeded(5, true);
    start_picking(&mut game, &rng);

    while game.status == GameStatus::Picking {
        let id = game
            .players
            .iter()
            .find(|p| p.hand.len() < game::HAND_SIZE)
            .map(|p| p.id.clone())
            .expect("picking phase with no short hand should have already transitioned");
        let position = *game.picking_tiles.keys().next().unwrap();
        game::picking::claim_tile(&mut game, &id, position).unwrap();
    }

    assert!(game.picking_tiles.is_empty());
    assert!(game.players.iter().all(|p| p.hand.len() == game::HAND_SIZE));
}

/// A 2v2 match credits the winning team, not just the winning seat.
#[test]
fn team_match_credits_team_not_individual() {
    let mut game = Game::new("g4".into(), Variant::Block, 4, 45, 30);
    for i in 0..4 {
        game.players.push(Player::new(format!("p{i}"), format!("P{i}"), false));
    }
    let mut record = GameRecord {
        game,
        match_data: Some(Match::new_teams("m4".into(), "g4".into(), &["p0", "p1", "p2", "p3"].map(String::from), 100)),
        cpu_turn_active: false,
        cpu_picking_active: false,
    };
    record.game.status = GameStatus::Playing;
    record.game.ends = game::BoardEnds::default();
    record.game.players[0].hand = vec![];
    record.game.players[1].hand = vec![Tile::new(6, 6)];
    record.game.players[2].hand = vec![Tile::new(5, 5)];
    record.game.players[3].hand = vec![Tile::new(4, 4)];

    settle_round_if_over(&mut record).unwrap();
    let m = record.match_data.as_ref().unwrap();
    assert_eq!(m.team_scores[&0], 12 + 8);
    assert_eq!(m.individual_scores.len(), 0);
}

/// Passing is rejected whenever a legal move exists, regardless of whether
/// the player would prefer to pass.
#[test]
fn pass_turn_rejected_with_legal_move_available() {
    let mut game = Game::new("g5".into(), Variant::Block, 2, 45, 30);
    game.players.push(Player::new("p0".into(), "A".into(), false));
    game.players.push(Player::new("p1".into(), "B".into(), false));
    game.status = GameStatus::Playing;
    game.current_turn = Some("p0".into());
    game.ends = game::BoardEnds { left: Some(2), right: Some(5) };
    game.players[0].hand = vec![Tile::new(2, 6)];

    let err = pass_turn(&mut game, "p0").unwrap_err();
    assert_eq!(err.code(), "move_available");
}

/// `start_new_round` resets board state but a match's accumulated scores
/// survive across rounds.
#[test]
fn next_round_resets_board_but_keeps_match_scores() {
    let mut game = Game::new("g6".into(), Variant::Block, 2, 45, 30);
    game.players.push(Player::new("p0".into(), "A".into(), false));
    game.players.push(Player::new("p1".into(), "B".into(), false));
    let mut m = Match::new_free_for_all("m6".into(), "g6".into(), &["p0".to_string(), "p1".to_string()], 150);
    m.record_round(1, "p0", false, 40);

    game.status = GameStatus::Finished;
    game.winner_id = Some("p0".into());
    game.round_number = 1;
    start_new_round(&mut game);
    game.round_number += 1;

    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.round_number, 2);
    assert_eq!(m.individual_scores["p0"], 40);
}

/// Only the creator (first seat) may start the game or add a CPU.
#[test]
fn only_creator_can_start_game_or_add_cpu() {
    let mut game = Game::new("g7".into(), Variant::Block, 4, 45, 30);
    game.players.push(Player::new("p0".into(), "Creator".into(), false));
    game.players.push(Player::new("p1".into(), "Other".into(), false));
    let mut record = GameRecord { game, match_data: None, cpu_turn_active: false, cpu_picking_active: false };
    let rng = StdRandomSource::seeded(2, true);

    let err = handle_start_game(&mut record, "p1", &rng).unwrap_err();
    assert_eq!(err.code(), "creator_only");

    let err = handle_add_cpu(&mut record, "p1", &rng).unwrap_err();
    assert_eq!(err.code(), "creator_only");

    assert!(handle_add_cpu(&mut record, "p0", &rng).is_ok());
    assert_eq!(record.game.players.len(), 3);
}
