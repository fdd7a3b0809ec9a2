//! Background sweep loops: stale-game cleanup, picking timeouts, and turn
//! timeouts. Each sweep runs on its own `tokio::time::interval` for the
//! lifetime of the process; `main.rs` spawns all three alongside the
//! transport server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::game::{self, picking, GameStatus};
use crate::rng::RandomSource;
use crate::transport::protocol::ServerEvent;
use crate::transport::ws::ConnectionHub;

use super::dispatch::{settle_round_if_over, tile_played_event, turn_passed_event};
use super::registry::SessionRegistry;

const WAITING_NO_HUMANS_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const FINISHED_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const INACTIVE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Removes games nobody is left to play: waiting rooms with no connected
/// human, finished rounds nobody came back to advance, and anything that
/// has simply gone quiet for an hour.
pub async fn cleanup_sweep(registry: SessionRegistry, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        for id in registry.all_ids() {
            let Ok(record) = registry.get(&id) else { continue };
            let should_remove = {
                let guard = record.lock().await;
                let idle = guard.game.last_activity.elapsed();
                (guard.game.status == GameStatus::Waiting && !guard.game.has_connected_humans() && idle > WAITING_NO_HUMANS_TIMEOUT)
                    || (guard.game.status == GameStatus::Finished && idle > FINISHED_TIMEOUT)
                    || idle > INACTIVE_TIMEOUT
            };
            if should_remove {
                registry.remove(&id);
            }
        }
    }
}

/// Deals any undrawn tiles once a picking phase has run past its deadline,
/// so a disconnected or idle picker can never stall the others forever.
pub async fn picking_timeout_sweep(registry: SessionRegistry, period: Duration, hub: ConnectionHub) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        for id in registry.all_ids() {
            let Ok(record) = registry.get(&id) else { continue };
            let mut guard = record.lock().await;
            let expired = guard
                .game
                .picking_started_at
                .is_some_and(|started| started.elapsed() > Duration::from_secs(guard.game.picking_timeout));
            if guard.game.status == GameStatus::Picking && expired {
                let before = guard.game.status;
                let assigned = picking::auto_assign_remaining_tiles(&mut guard.game);
                let round_started = if before == GameStatus::Picking && guard.game.status == GameStatus::Playing {
                    Some(ServerEvent::RoundStarted { round_number: guard.game.round_number })
                } else {
                    None
                };
                hub.broadcast_state(&id, &guard.game, guard.match_data.as_ref()).await;
                for (player_id, positions) in assigned {
                    let event = ServerEvent::TilesAutoAssigned { player_id, positions, reason: "timeout".to_string() };
                    hub.broadcast_event(&id, &guard.game, &event).await;
                }
                if let Some(event) = round_started {
                    hub.broadcast_event(&id, &guard.game, &event).await;
                }
            }
        }
    }
}

/// Auto-resolves a turn that's run past its deadline: plays the CPU-style
/// best move if one exists, otherwise passes, exactly as if the seated
/// player had acted themselves.
pub async fn turn_timeout_sweep(registry: SessionRegistry, period: Duration, rng: Arc<dyn RandomSource>, hub: ConnectionHub) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        for id in registry.all_ids() {
            let Ok(record) = registry.get(&id) else { continue };
            let mut guard = record.lock().await;
            let expired = guard
                .game
                .turn_started_at
                .is_some_and(|started| started.elapsed() > Duration::from_secs(guard.game.turn_timeout));
            if guard.game.status != GameStatus::Playing || !expired {
                continue;
            }
            let Some(current) = guard.game.current_turn.clone() else { continue };
            let hand = guard.game.get_player(&current).map(|p| p.hand.clone()).unwrap_or_default();
            let chosen = game::cpu::choose_cpu_move(&hand, guard.game.ends, rng.as_ref());

            let action_event = match chosen {
                Some((tile, side)) => game::play_tile(&mut guard.game, &current, tile, side)
                    .map(|_| tile_played_event(&current, tile, side, true)),
                None => game::pass_turn(&mut guard.game, &current).map(|_| turn_passed_event(&current, true)),
            };
            if let Ok(action_event) = action_event {
                let round_event = settle_round_if_over(&mut guard);
                hub.broadcast_state(&id, &guard.game, guard.match_data.as_ref()).await;
                hub.broadcast_event(&id, &guard.game, &action_event).await;
                if let Some(event) = round_event {
                    hub.broadcast_event(&id, &guard.game, &event).await;
                }
            }
        }
    }
}
