//! REST surface: list/create/get/join games plus a stats endpoint, behind
//! a permissive CORS layer.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::game::{self, Game, GameStatus, Match, Variant};
use crate::rng::RandomSource;
use crate::services::registry::SessionRegistry;

use super::ws::ConnectionHub;

#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    pub hub: ConnectionHub,
    pub rng: Arc<dyn RandomSource>,
    pub default_picking_timeout: u64,
    pub default_turn_timeout: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{id}/join", post(join_game))
        .route("/api/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct GameSummaryResponse {
    id: String,
    variant: Variant,
    status: GameStatus,
    player_count: usize,
    max_players: usize,
    players: Vec<String>,
}

fn summarize(game: &Game) -> GameSummaryResponse {
    GameSummaryResponse {
        id: game.id.clone(),
        variant: game.variant,
        status: game.status,
        player_count: game.players.len(),
        max_players: game.max_players,
        players: game.players.iter().map(|p| p.name.clone()).collect(),
    }
}

/// Open (WAITING) games only — a lobby listing, not a full game directory.
async fn list_games(State(state): State<AppState>) -> Json<Vec<GameSummaryResponse>> {
    let mut summaries = Vec::new();
    for id in state.registry.all_ids() {
        if let Ok(record) = state.registry.get(&id) {
            let guard = record.lock().await;
            if guard.game.status == GameStatus::Waiting {
                summaries.push(summarize(&guard.game));
            }
        }
    }
    Json(summaries)
}

const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 4;
const MAX_CPU_PLAYERS: usize = 3;
const MIN_TARGET_SCORE: i32 = 50;
const MAX_TARGET_SCORE: i32 = 500;
const DEFAULT_TARGET_SCORE: i32 = 100;

#[derive(Debug, Deserialize)]
struct CreateGameRequest {
    player_name: String,
    #[serde(default = "default_variant")]
    variant: Variant,
    #[serde(default = "default_max_players")]
    max_players: usize,
    #[serde(default)]
    cpu_players: usize,
    #[serde(default = "default_target_score")]
    target_score: i32,
}

fn default_variant() -> Variant {
    Variant::Block
}

fn default_max_players() -> usize {
    MAX_PLAYERS
}

fn default_target_score() -> i32 {
    DEFAULT_TARGET_SCORE
}

#[derive(Debug, Serialize)]
struct CreateGameResponse {
    game_id: String,
    player_id: String,
    player_name: String,
    match_id: String,
}

/// Creates the game, seats the requesting player plus any requested CPUs,
/// and starts a match (team if the table seats four, free-for-all
/// otherwise) so scoring has somewhere to accumulate from the first round.
async fn create_game(State(state): State<AppState>, Json(req): Json<CreateGameRequest>) -> Json<CreateGameResponse> {
    let max_players = req.max_players.clamp(MIN_PLAYERS, MAX_PLAYERS);
    let cpu_players = req.cpu_players.min(MAX_CPU_PLAYERS).min(max_players.saturating_sub(1));
    let target_score = req.target_score.clamp(MIN_TARGET_SCORE, MAX_TARGET_SCORE);

    let record = state.registry.create_game(
        req.variant,
        max_players,
        state.default_picking_timeout,
        state.default_turn_timeout,
    );

    let player_id = uuid::Uuid::new_v4().to_string();
    let (game_id, match_id);
    {
        let mut guard = record.lock().await;
        guard.game.players.push(game::Player::new(player_id.clone(), req.player_name.clone(), false));

        for _ in 0..cpu_players {
            let taken: Vec<String> = guard.game.players.iter().map(|p| p.name.clone()).collect();
            let name = game::cpu::pick_cpu_name(&taken, state.rng.as_ref());
            let id = format!("cpu-{}", uuid::Uuid::new_v4());
            guard.game.players.push(game::Player::new(id, name, true));
        }

        game_id = guard.game.id.clone();
        let player_ids: Vec<String> = guard.game.players.iter().map(|p| p.id.clone()).collect();
        let m = if max_players == 4 {
            Match::new_teams(uuid::Uuid::new_v4().to_string(), game_id.clone(), &player_ids, target_score)
        } else {
            Match::new_free_for_all(uuid::Uuid::new_v4().to_string(), game_id.clone(), &player_ids, target_score)
        };
        match_id = m.id.clone();
        guard.game.match_id = Some(match_id.clone());
        guard.match_data = Some(m);
    }

    Json(CreateGameResponse { game_id, player_id, player_name: req.player_name, match_id })
}

async fn get_game(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<GameSummaryResponse>, ApiError> {
    let record = state.registry.get(&id).map_err(ApiError)?;
    Ok(Json(summarize(&record.lock().await.game)))
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    player_name: String,
}

#[derive(Debug, Serialize)]
struct JoinResponse {
    player_id: String,
}

async fn join_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let record = state.registry.get(&id).map_err(ApiError)?;
    let mut guard = record.lock().await;
    if guard.game.status != GameStatus::Waiting {
        return Err(ApiError(crate::error::StateError::GameInProgress.into()));
    }
    if guard.game.is_full() {
        return Err(ApiError(crate::error::StateError::GameFull.into()));
    }
    if guard.game.players.iter().any(|p| p.name == req.player_name) {
        return Err(ApiError(crate::error::StateError::NameTaken.into()));
    }

    let player_id = uuid::Uuid::new_v4().to_string();
    guard.game.players.push(game::Player::new(player_id.clone(), req.player_name, false));
    let seat_index = guard.game.players.len() - 1;

    if let Some(m) = &mut guard.match_data {
        if m.is_team_match() {
            let team = if seat_index % 2 == 0 { &mut m.team_a } else { &mut m.team_b };
            if let Some(roster) = team {
                roster.push(player_id.clone());
            }
        } else {
            m.individual_scores.entry(player_id.clone()).or_insert(0);
        }
    }

    Ok(Json(JoinResponse { player_id }))
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    total_games: usize,
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse { total_games: state.registry.total_games() })
}

struct ApiError(crate::error::GameError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.code() {
            "game_not_found" | "player_not_found" => StatusCode::NOT_FOUND,
            "game_full" | "game_in_progress" | "name_taken" => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "code": self.0.code(), "message": self.0.to_string() }))).into_response()
    }
}
