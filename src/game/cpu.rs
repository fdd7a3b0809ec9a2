//! CPU opponents: name assignment and a move-scoring heuristic.

use super::board::BoardEnds;
use super::rules::{legal_moves, Side};
use super::tile::Tile;
use crate::rng::RandomSource;

/// Primate species used to name CPU seats.
pub const CPU_NAMES: &[&str] = &[
    "Mandrill", "Gorilla", "Chimpanzee", "Orangutan", "Bonobo", "Gibbon",
    "Macaque", "Baboon", "Tamarin", "Marmoset", "Capuchin", "Howler Monkey",
    "Spider Monkey", "Squirrel Monkey", "Colobus", "Langur", "Proboscis Monkey",
    "Vervet Monkey", "Patas Monkey", "Mangabey", "Guenon", "Douc Langur",
    "Snub-nosed Monkey", "Gelada", "Drill", "Talapoin", "Saki Monkey",
    "Uakari", "Titi Monkey", "Night Monkey", "Woolly Monkey", "Muriqui",
    "Tarsier", "Lemur", "Aye-aye", "Sifaka", "Indri", "Loris", "Galago",
    "Potto", "Bushbaby", "Rhesus Macaque", "Japanese Macaque",
    "Barbary Macaque", "Crab-eating Macaque", "Lion-tailed Macaque",
    "Red Colobus", "Black Colobus", "Hanuman Langur", "Dusky Langur",
    "Silvered Langur", "Golden Monkey", "De Brazza's Monkey",
    "Diana Monkey", "Moustached Monkey",
];

/// Scores a single legal move: doubles weigh heavier, a tile's own pip
/// total counts, and shared pips with other tiles still in hand reward
/// keeping the remaining hand flexible.
fn score_move(tile: Tile, hand: &[Tile]) -> f64 {
    let mut score = tile.total() as f64;
    if tile.is_double() {
        score += 10.0;
    }
    for other in hand {
        if *other == tile {
            continue;
        }
        if other.left == tile.left || other.left == tile.right || other.right == tile.left || other.right == tile.right {
            score += 1.0;
        }
    }
    score
}

/// Picks the CPU's next move, breaking ties with `rng` so repeated equal
/// scores don't always resolve the same way.
pub fn choose_cpu_move(hand: &[Tile], ends: BoardEnds, rng: &dyn RandomSource) -> Option<(Tile, Side)> {
    let candidates = legal_moves(hand, ends);
    if candidates.is_empty() {
        return None;
    }

    let mut scored: Vec<(f64, f64, Tile, Side)> = candidates
        .into_iter()
        .map(|(tile, side)| (score_move(tile, hand), rng.gen_range_f64(0.0, 1.0), tile, side))
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap()
            .then_with(|| b.1.partial_cmp(&a.1).unwrap())
    });
    scored.into_iter().next().map(|(_, _, tile, side)| (tile, side))
}

pub fn pick_cpu_name(taken: &[String], rng: &dyn RandomSource) -> String {
    let available: Vec<&&str> = CPU_NAMES.iter().filter(|n| !taken.iter().any(|t| t == *n)).collect();
    if available.is_empty() {
        return format!("CPU {}", taken.len() + 1);
    }
    let idx = rng.gen_index(available.len());
    available[idx].to_string()
}
