//! Move Validation and Turn Rotation
//!
//! The per-match state machine: a submitted move is either rejected
//! (leaving state untouched), resolved as correct, or resolved as
//! incorrect. Every accepted move, right or wrong, consumes the turn;
//! there is no retry on a bad guess.

use crate::game::grid::GRID_SIZE;
use crate::game::state::{MatchState, PlayerNumber};

/// Why a move submission was refused.
///
/// Rejections are protocol violations: the caller drops them silently
/// and sends no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    /// Coordinates outside `0..=8`.
    #[error("coordinates out of bounds")]
    OutOfBounds,

    /// Submitting player does not own the current turn.
    #[error("not this player's turn")]
    NotYourTurn,

    /// Target cell is already filled.
    #[error("cell already filled")]
    CellOccupied,
}

/// Resolution of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Guess matched the solution. `completed` is set when this move
    /// filled the last empty cell.
    Correct {
        /// Whether the board is now full.
        completed: bool,
    },

    /// Guess did not match the solution. Board untouched, mover
    /// penalized, turn consumed.
    Incorrect,
}

/// Submit a move for resolution.
///
/// On `Correct { completed: false }` and `Incorrect` the turn has rotated
/// to the other player. On `Correct { completed: true }` the turn is left
/// as-is; the caller broadcasts the final state and resets the match.
///
/// Score contract: a correct move is exactly `+1` for the mover, an
/// incorrect move exactly `-1` (scores may go negative). No other path
/// changes scores.
pub fn submit_move(
    state: &mut MatchState,
    player: PlayerNumber,
    x: u8,
    y: u8,
    value: u8,
) -> Result<MoveOutcome, MoveRejection> {
    if (x as usize) >= GRID_SIZE || (y as usize) >= GRID_SIZE {
        return Err(MoveRejection::OutOfBounds);
    }
    if player != state.turn {
        return Err(MoveRejection::NotYourTurn);
    }
    if state.cell_at(x, y) != 0 {
        return Err(MoveRejection::CellOccupied);
    }

    // A value outside 1..=9 can never match the solution, so it falls
    // through as an ordinary incorrect guess rather than a violation.
    if state.solution_at(x, y) == value {
        state.apply_correct_move(player, x, y, value);

        if state.is_complete() {
            return Ok(MoveOutcome::Correct { completed: true });
        }

        state.rotate_turn();
        Ok(MoveOutcome::Correct { completed: false })
    } else {
        state.scores[player as usize] -= 1;
        state.rotate_turn();
        Ok(MoveOutcome::Incorrect)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_match() -> MatchState {
        MatchState::new([3u8; 16], 42, 10)
    }

    fn first_empty_cell(state: &MatchState) -> (u8, u8) {
        for y in 0..GRID_SIZE as u8 {
            for x in 0..GRID_SIZE as u8 {
                if state.cell_at(x, y) == 0 {
                    return (x, y);
                }
            }
        }
        panic!("board has no empty cell");
    }

    fn first_filled_cell(state: &MatchState) -> (u8, u8) {
        for y in 0..GRID_SIZE as u8 {
            for x in 0..GRID_SIZE as u8 {
                if state.cell_at(x, y) != 0 {
                    return (x, y);
                }
            }
        }
        panic!("board has no filled cell");
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut state = test_match();
        let before = state.clone();

        assert_eq!(
            submit_move(&mut state, 0, 9, 0, 5),
            Err(MoveRejection::OutOfBounds)
        );
        assert_eq!(
            submit_move(&mut state, 0, 0, 9, 5),
            Err(MoveRejection::OutOfBounds)
        );

        assert_eq!(state.board, before.board);
        assert_eq!(state.scores, before.scores);
        assert_eq!(state.turn, before.turn);
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let mut state = test_match();
        let (x, y) = first_empty_cell(&state);
        let value = state.solution_at(x, y);
        let before = state.clone();

        // Player 1 moves while it is player 0's turn
        assert_eq!(
            submit_move(&mut state, 1, x, y, value),
            Err(MoveRejection::NotYourTurn)
        );

        assert_eq!(state.board, before.board);
        assert_eq!(state.scores, before.scores);
        assert_eq!(state.turn, 0);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut state = test_match();
        let (x, y) = first_filled_cell(&state);
        let before = state.clone();

        assert_eq!(
            submit_move(&mut state, 0, x, y, 5),
            Err(MoveRejection::CellOccupied)
        );

        assert_eq!(state.board, before.board);
        assert_eq!(state.scores, before.scores);
        assert_eq!(state.turn, before.turn);
    }

    #[test]
    fn test_correct_move_scores_and_rotates() {
        let mut state = test_match();
        let (x, y) = first_empty_cell(&state);
        let value = state.solution_at(x, y);

        let outcome = submit_move(&mut state, 0, x, y, value).unwrap();

        assert_eq!(outcome, MoveOutcome::Correct { completed: false });
        assert_eq!(state.cell_at(x, y), value);
        assert_eq!(state.scores, [1, 0]);
        assert_eq!(state.turn, 1);
        assert!(state.correct_cells.contains(&(x, y)));
    }

    #[test]
    fn test_incorrect_move_penalizes_and_rotates() {
        let mut state = test_match();
        let (x, y) = first_empty_cell(&state);
        let value = state.solution_at(x, y);
        let wrong = if value == 9 { 1 } else { value + 1 };

        let outcome = submit_move(&mut state, 0, x, y, wrong).unwrap();

        assert_eq!(outcome, MoveOutcome::Incorrect);
        assert_eq!(state.cell_at(x, y), 0);
        assert_eq!(state.scores, [-1, 0]);
        assert_eq!(state.turn, 1);
        assert!(!state.correct_cells.contains(&(x, y)));
    }

    #[test]
    fn test_score_can_go_negative() {
        let mut state = test_match();

        for _ in 0..3 {
            let (x, y) = first_empty_cell(&state);
            let value = state.solution_at(x, y);
            let wrong = if value == 9 { 1 } else { value + 1 };
            let mover = state.turn;
            submit_move(&mut state, mover, x, y, wrong).unwrap();
        }

        assert_eq!(state.scores[0] + state.scores[1], -3);
        assert!(state.scores[0] < 0);
    }

    #[test]
    fn test_zero_value_is_incorrect_guess() {
        let mut state = test_match();
        let (x, y) = first_empty_cell(&state);

        let outcome = submit_move(&mut state, 0, x, y, 0).unwrap();

        assert_eq!(outcome, MoveOutcome::Incorrect);
        assert_eq!(state.cell_at(x, y), 0);
        assert_eq!(state.scores, [-1, 0]);
    }

    #[test]
    fn test_completion_on_last_cell() {
        let mut state = test_match();

        // Fill all empty cells but one with alternating turns
        loop {
            let empties: Vec<(u8, u8)> = (0..GRID_SIZE as u8)
                .flat_map(|y| (0..GRID_SIZE as u8).map(move |x| (x, y)))
                .filter(|&(x, y)| state.cell_at(x, y) == 0)
                .collect();

            let &(x, y) = empties.first().unwrap();
            let value = state.solution_at(x, y);
            let mover = state.turn;
            let outcome = submit_move(&mut state, mover, x, y, value).unwrap();

            if empties.len() == 1 {
                assert_eq!(outcome, MoveOutcome::Correct { completed: true });
                break;
            }
            assert_eq!(outcome, MoveOutcome::Correct { completed: false });
        }

        assert!(state.is_complete());
    }
}
