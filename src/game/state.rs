//! Match State
//!
//! The single authoritative game instance: board, solution, turn owner,
//! scores, and the set of correctly filled cells. Uses BTreeSet for
//! deterministic iteration order.
//!
//! This type trusts its caller: all move validation lives in
//! [`crate::game::turn`], and only validated correct moves are applied
//! here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::rng::{derive_match_seed, DeterministicRng};
use crate::game::grid::{self, Board, GRID_SIZE};

/// Number of players in a match. This is a two-seat table, always.
pub const PLAYER_COUNT: usize = 2;

/// Unique match identifier (UUID as bytes). Used for log correlation,
/// never sent on the wire.
pub type MatchId = [u8; 16];

/// Player slot number, `0` or `1`, assigned in join order.
pub type PlayerNumber = u8;

/// Authoritative state of the live match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Match identifier.
    pub id: MatchId,

    /// Player-facing board. `0` = empty.
    pub board: Board,

    /// Solved grid, ground truth for move validation.
    solution: Board,

    /// Player number currently authorized to move.
    pub turn: PlayerNumber,

    /// Per-player scores, indexed by player number. May go negative.
    pub scores: [i64; PLAYER_COUNT],

    /// Cells filled correctly during this match, as `(x, y)`.
    /// Presentation data only, never consulted for validation.
    pub correct_cells: BTreeSet<(u8, u8)>,
}

impl MatchState {
    /// Create a fresh match: new puzzle, zero scores, player 0 to move.
    pub fn new(id: MatchId, seed: u64, holes: usize) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let puzzle = grid::generate(&mut rng, holes);

        Self {
            id,
            board: puzzle.board,
            solution: puzzle.solution,
            turn: 0,
            scores: [0; PLAYER_COUNT],
            correct_cells: BTreeSet::new(),
        }
    }

    /// Create a fresh match with a random identity and time-derived seed.
    pub fn generate(holes: usize, entropy: u64) -> Self {
        let id = *uuid::Uuid::new_v4().as_bytes();
        let seed = derive_match_seed(&id, entropy);
        Self::new(id, seed, holes)
    }

    /// Value of the board cell at `(x, y)`.
    #[inline]
    pub fn cell_at(&self, x: u8, y: u8) -> u8 {
        self.board[y as usize][x as usize]
    }

    /// Value of the solution at `(x, y)`.
    #[inline]
    pub(crate) fn solution_at(&self, x: u8, y: u8) -> u8 {
        self.solution[y as usize][x as usize]
    }

    /// True iff no board cell is empty.
    pub fn is_complete(&self) -> bool {
        self.board
            .iter()
            .all(|row| row.iter().all(|&cell| cell != 0))
    }

    /// Apply a move already validated as correct: set the cell, credit
    /// the mover, record the cell as correctly filled.
    pub fn apply_correct_move(&mut self, player: PlayerNumber, x: u8, y: u8, value: u8) {
        debug_assert!((x as usize) < GRID_SIZE && (y as usize) < GRID_SIZE);
        debug_assert_eq!(self.solution_at(x, y), value);
        debug_assert_eq!(self.cell_at(x, y), 0);

        self.board[y as usize][x as usize] = value;
        self.scores[player as usize] += 1;
        self.correct_cells.insert((x, y));
    }

    /// Rotate the turn to the other player.
    #[inline]
    pub fn rotate_turn(&mut self) {
        self.turn = (self.turn + 1) % PLAYER_COUNT as u8;
    }
}

// =============================================================================
// TESTS
// =============================================================================
