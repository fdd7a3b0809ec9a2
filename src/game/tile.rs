use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A double-six domino: an unordered pair of pip counts in `0..=6`.
///
/// Equality and hashing are orientation-insensitive (`{a,b} == {b,a}`); the
/// two fields still carry whatever orientation the tile was constructed or
/// placed with, since `PlayedTile` relies on that to render the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    pub left: u8,
    pub right: u8,
}

impl Tile {
    pub fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    pub fn is_double(&self) -> bool {
        self.left == self.right
    }

    pub fn total(&self) -> u32 {
        self.left as u32 + self.right as u32
    }

    /// The tile with its two pips swapped.
    pub fn flipped(&self) -> Tile {
        Tile::new(self.right, self.left)
    }

    /// The orientation-independent identity of this tile.
    fn canonical(&self) -> (u8, u8) {
        if self.left <= self.right {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        }
    }

    /// The full double-six set: all 28 tiles `{i,j}` with `0 <= i <= j <= 6`.
    pub fn full_set() -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(28);
        for i in 0..=6 {
            for j in i..=6 {
                tiles.push(Tile::new(i, j));
            }
        }
        tiles
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_has_28_distinct_tiles() {
        let set = Tile::full_set();
        assert_eq!(set.len(), 28);
        assert!(set.contains(&Tile::new(6, 6)));
        assert!(set.contains(&Tile::new(0, 0)));
        assert!(set.contains(&Tile::new(3, 5)));
    }

    #[test]
    fn equality_is_orientation_insensitive() {
        assert_eq!(Tile::new(3, 5), Tile::new(5, 3));
        assert_ne!(Tile::new(3, 5), Tile::new(3, 4));
    }

    #[test]
    fn hashing_agrees_with_equality() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Tile::new(2, 6));
        assert!(set.contains(&Tile::new(6, 2)));
    }

    #[test]
    fn is_double_and_total() {
        assert!(Tile::new(4, 4).is_double());
        assert!(!Tile::new(4, 5).is_double());
        assert_eq!(Tile::new(4, 5).total(), 9);
    }

    #[test]
    fn flipped_swaps_pips_but_stays_equal() {
        let t = Tile::new(2, 6);
        let f = t.flipped();
        assert_eq!(f.left, 6);
        assert_eq!(f.right, 2);
        assert_eq!(t, f);
    }
}
