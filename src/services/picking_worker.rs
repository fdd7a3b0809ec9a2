//! The CPU picking worker: while the game is picking, each CPU seat claims
//! one face-down tile at a time with a short pacing delay, same shape as
//! [`super::cpu_driver`] but driving the picking phase instead of turn play.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::game::{picking, GameStatus};
use crate::rng::RandomSource;
use crate::transport::protocol::ServerEvent;
use crate::transport::ws::ConnectionHub;

use super::registry::{clear_cpu_picking_worker, GameRecord};

pub async fn run(record: Arc<Mutex<GameRecord>>, game_id: String, cpu_id: String, rng: Arc<dyn RandomSource>, hub: ConnectionHub) {
    loop {
        let delay = {
            let guard = record.lock().await;
            if !cpu_still_picking(&guard, &cpu_id) {
                break;
            }
            rng.picking_delay()
        };
        tokio::time::sleep(delay).await;

        let mut guard = record.lock().await;
        if !cpu_still_picking(&guard, &cpu_id) {
            break;
        }

        let before = guard.game.status;
        let Some(position) = picking::cpu_claim_tile(&mut guard.game, &cpu_id, rng.as_ref()) else {
            break;
        };
        let round_started = if before == GameStatus::Picking && guard.game.status == GameStatus::Playing {
            Some(ServerEvent::RoundStarted { round_number: guard.game.round_number })
        } else {
            None
        };
        hub.broadcast_state(&game_id, &guard.game, guard.match_data.as_ref()).await;
        hub.broadcast_event(&game_id, &guard.game, &ServerEvent::TileClaimed { player_id: cpu_id.clone(), position }).await;
        if let Some(event) = round_started {
            hub.broadcast_event(&game_id, &guard.game, &event).await;
        }
    }

    let mut guard = record.lock().await;
    clear_cpu_picking_worker(&mut guard);
}

fn cpu_still_picking(record: &GameRecord, cpu_id: &str) -> bool {
    record.game.status == GameStatus::Picking
        && record
            .game
            .get_player(cpu_id)
            .is_some_and(|p| p.hand.len() < crate::game::HAND_SIZE)
}
