use super::tile::Tile;
use serde::{Deserialize, Serialize};

/// The two currently-playable pip values at the ends of the board chain.
/// `left == right == None` iff the board is empty.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardEnds {
    pub left: Option<u8>,
    pub right: Option<u8>,
}

impl BoardEnds {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A tile as placed on the board, in its placed orientation, tagged with a
/// monotonically increasing play index (not a spatial position — two tiles
/// played onto the same end never share an index, regardless of which side
/// of the chain they landed on).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayedTile {
    pub tile: Tile,
    pub position: u32,
}

/// The play index to assign to the next tile placed on `board`.
pub fn next_position(board: &[PlayedTile]) -> u32 {
    board.iter().map(|p| p.position).max().map_or(0, |m| m + 1)
}
