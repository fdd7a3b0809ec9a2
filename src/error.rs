//! Domain-classified errors. Every variant carries a stable, machine-readable
//! code so clients can switch on it instead of the human-readable message.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed frame: missing or invalid field")]
    MalformedFrame,
    #[error("side must be \"left\" or \"right\"")]
    InvalidSide,
}

impl ValidationError {
    pub fn code(self) -> &'static str {
        match self {
            ValidationError::MalformedFrame => "malformed_frame",
            ValidationError::InvalidSide => "invalid_side",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("only the game creator may do that")]
    CreatorOnly,
    #[error("you have a legal move; passing is not allowed")]
    MoveAvailable,
}

impl AuthorizationError {
    pub fn code(self) -> &'static str {
        match self {
            AuthorizationError::NotYourTurn => "not_your_turn",
            AuthorizationError::CreatorOnly => "creator_only",
            AuthorizationError::MoveAvailable => "move_available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("game not found")]
    GameNotFound,
    #[error("player not found")]
    PlayerNotFound,
    #[error("game is full")]
    GameFull,
    #[error("game has already started")]
    GameInProgress,
    #[error("name already taken in this game")]
    NameTaken,
    #[error("need at least two players to start")]
    NotEnoughPlayers,
    #[error("game is not in the playing phase")]
    NotPlaying,
    #[error("game is not in the picking phase")]
    NotPicking,
    #[error("tile is not in your hand")]
    TileNotInHand,
    #[error("tile does not match the chosen end")]
    EndMismatch,
    #[error("that grid position is no longer available")]
    PositionTaken,
    #[error("your hand is already full")]
    HandFull,
    #[error("current round is not finished")]
    RoundNotFinished,
    #[error("match is already over")]
    MatchOver,
}

impl StateError {
    pub fn code(self) -> &'static str {
        match self {
            StateError::GameNotFound => "game_not_found",
            StateError::PlayerNotFound => "player_not_found",
            StateError::GameFull => "game_full",
            StateError::GameInProgress => "game_in_progress",
            StateError::NameTaken => "name_taken",
            StateError::NotEnoughPlayers => "not_enough_players",
            StateError::NotPlaying => "not_playing",
            StateError::NotPicking => "not_picking",
            StateError::TileNotInHand => "tile_not_in_hand",
            StateError::EndMismatch => "end_mismatch",
            StateError::PositionTaken => "position_taken",
            StateError::HandFull => "hand_full",
            StateError::RoundNotFinished => "round_not_finished",
            StateError::MatchOver => "match_over",
        }
    }
}

#[derive(Debug, Clone, Copy, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(e) => e.code(),
            GameError::Authorization(e) => e.code(),
            GameError::State(e) => e.code(),
        }
    }
}
