//! Multi-round match bookkeeping: team or individual scoreboards accumulated
//! across rounds until one side reaches the target score.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished round, kept for the match history view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_number: u32,
    pub winner_id: String,
    pub was_blocked: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub game_id: String,
    /// `Some` only for 2v2 games; seats are assigned 0+2 vs 1+3 by join
    /// order.
    pub team_a: Option<Vec<String>>,
    pub team_b: Option<Vec<String>>,
    pub team_scores: HashMap<u8, i32>,
    pub individual_scores: HashMap<String, i32>,
    pub rounds: Vec<RoundResult>,
    pub target_score: i32,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn new_free_for_all(id: String, game_id: String, player_ids: &[String], target_score: i32) -> Self {
        Self {
            id,
            game_id,
            team_a: None,
            team_b: None,
            individual_scores: player_ids.iter().map(|p| (p.clone(), 0)).collect(),
            team_scores: HashMap::new(),
            rounds: Vec::new(),
            target_score,
            created_at: Utc::now(),
        }
    }

    pub fn new_teams(id: String, game_id: String, player_ids: &[String], target_score: i32) -> Self {
        let team_a: Vec<String> = player_ids.iter().step_by(2).cloned().collect();
        let team_b: Vec<String> = player_ids.iter().skip(1).step_by(2).cloned().collect();
        let mut team_scores = HashMap::new();
        team_scores.insert(0, 0);
        team_scores.insert(1, 0);
        Self {
            id,
            game_id,
            team_a: Some(team_a),
            team_b: Some(team_b),
            team_scores,
            individual_scores: HashMap::new(),
            rounds: Vec::new(),
            target_score,
            created_at: Utc::now(),
        }
    }

    pub fn is_team_match(&self) -> bool {
        self.team_a.is_some()
    }

    pub fn team_for_player(&self, player_id: &str) -> Option<u8> {
        if self.team_a.as_ref().is_some_and(|t| t.iter().any(|p| p == player_id)) {
            return Some(0);
        }
        if self.team_b.as_ref().is_some_and(|t| t.iter().any(|p| p == player_id)) {
            return Some(1);
        }
        None
    }

    /// Records a completed round's points against whichever scoreboard
    /// applies, and appends it to history.
    pub fn record_round(&mut self, round_number: u32, winner_id: &str, was_blocked: bool, points: i32) {
        if self.is_team_match() {
            if let Some(team) = self.team_for_player(winner_id) {
                *self.team_scores.entry(team).or_insert(0) += points;
            }
        } else {
            *self.individual_scores.entry(winner_id.to_string()).or_insert(0) += points;
        }
        self.rounds.push(RoundResult {
            round_number,
            winner_id: winner_id.to_string(),
            was_blocked,
            points,
        });
    }

    /// `Some(winner)` once any scoreboard entry has reached `target_score`.
    /// For team matches the winner is `"team_a"` / `"team_b"`; for
    /// free-for-all it's the player id.
    pub fn get_winner(&self) -> Option<String> {
        if self.is_team_match() {
            for (team, score) in &self.team_scores {
                if *score >= self.target_score {
                    return Some(if *team == 0 { "team_a".to_string() } else { "team_b".to_string() });
                }
            }
            None
        } else {
            self.individual_scores
                .iter()
                .find(|(_, score)| **score >= self.target_score)
                .map(|(id, _)| id.clone())
        }
    }

    pub fn is_over(&self) -> bool {
        self.get_winner().is_some()
    }
}
