//! Game Logic Module
//!
//! All game rules, free of I/O. Everything here is deterministic given
//! the match seed.
//!
//! ## Module Structure
//!
//! - `grid`: Puzzle generation (solved grid + dug board)
//! - `state`: The authoritative match state
//! - `turn`: Move validation and turn rotation

pub mod grid;
pub mod state;
pub mod turn;

// Re-export key types
pub use grid::{Board, Puzzle, DEFAULT_HOLES, GRID_SIZE, SUB_GRID_SIZE};
pub use state::{MatchId, MatchState, PlayerNumber, PLAYER_COUNT};
pub use turn::{submit_move, MoveOutcome, MoveRejection};
