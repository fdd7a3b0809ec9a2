//! # dominoes-engine
//!
//! Realtime session engine for multi-player, multi-round double-six
//! dominoes: a rules engine, a picking-phase and turn-phase coordinator,
//! CPU opponents, and the WebSocket/HTTP transport that drives them.
//!
//! ## Modules
//!
//! - [`game`]: tiles, board, rules, scoring, match bookkeeping, CPU
//!   heuristics, and per-player sanitized views.
//! - [`services`]: the session registry, client-frame dispatch, CPU
//!   background drivers, and timeout sweeps.
//! - [`transport`]: the wire protocol, WebSocket connection handling, and
//!   the REST surface.
//! - [`config`]: CLI configuration.
//! - [`error`]: domain-classified errors with stable codes.
//! - [`rng`]: the injectable randomness seam used throughout for
//!   deterministic tests.

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod rng;
pub mod services;
pub mod transport;

pub use error::GameError;
pub use rng::{RandomSource, StdRandomSource};
