//! The CPU turn driver. One task per game runs while it's a CPU seat's
//! turn, thinking for a random delay between moves so a human watching the
//! board can follow along.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::game::{self, GameStatus};
use crate::rng::RandomSource;
use crate::transport::ws::ConnectionHub;

use super::dispatch::{settle_round_if_over, tile_played_event, turn_passed_event};
use super::registry::{clear_cpu_turn_driver, GameRecord};

pub async fn run(record: Arc<Mutex<GameRecord>>, game_id: String, rng: Arc<dyn RandomSource>, hub: ConnectionHub) {
    loop {
        let delay = {
            let guard = record.lock().await;
            if !is_cpu_turn(&guard) {
                break;
            }
            rng.turn_delay()
        };
        tokio::time::sleep(delay).await;

        let mut guard = record.lock().await;
        if !is_cpu_turn(&guard) {
            break;
        }

        let Some(current) = guard.game.current_turn.clone() else { break };
        let hand = guard.game.get_player(&current).map(|p| p.hand.clone()).unwrap_or_default();
        let chosen = game::cpu::choose_cpu_move(&hand, guard.game.ends, rng.as_ref());

        let action_event = match chosen {
            Some((tile, side)) => game::play_tile(&mut guard.game, &current, tile, side).map(|_| tile_played_event(&current, tile, side, false)),
            None => game::pass_turn(&mut guard.game, &current).map(|_| turn_passed_event(&current, false)),
        };
        let Ok(action_event) = action_event else { break };

        let round_event = settle_round_if_over(&mut guard);
        hub.broadcast_state(&game_id, &guard.game, guard.match_data.as_ref()).await;
        hub.broadcast_event(&game_id, &guard.game, &action_event).await;
        if let Some(event) = round_event {
            hub.broadcast_event(&game_id, &guard.game, &event).await;
        }
    }

    let mut guard = record.lock().await;
    clear_cpu_turn_driver(&mut guard);
}

fn is_cpu_turn(record: &GameRecord) -> bool {
    record.game.status == GameStatus::Playing
        && record
            .game
            .current_turn
            .as_deref()
            .and_then(|id| record.game.get_player(id))
            .is_some_and(|p| p.is_cpu)
}
