pub mod board;
pub mod cpu;
pub mod match_state;
pub mod picking;
pub mod player;
pub mod rules;
pub mod scoring;
pub mod state;
pub mod tile;
pub mod view;

pub use board::{next_position, BoardEnds, PlayedTile};
pub use match_state::{Match, RoundResult};
pub use player::Player;
pub use rules::{check_round_over, legal_moves, pass_turn, play_tile, validate_side, Side};
pub use state::{
    advance_turn, finish_round, start_new_round, start_picking, try_begin_play, Game, GameStatus,
    Variant, GRID_SIZE, HAND_SIZE,
};
pub use tile::Tile;
pub use view::{build_player_view, MatchView, PlayerView, SeatView};
