use super::tile::Tile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hand: Vec<Tile>,
    pub is_cpu: bool,
    pub connected: bool,
    pub score: i32,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: String, name: String, is_cpu: bool) -> Self {
        Self {
            id,
            name,
            hand: Vec::new(),
            is_cpu,
            connected: true,
            score: 0,
            joined_at: Utc::now(),
        }
    }

    pub fn hand_total(&self) -> u32 {
        self.hand.iter().map(|t| t.total()).sum()
    }
}
