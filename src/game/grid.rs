//! Puzzle Generation
//!
//! Produces a fully solved 9x9 Sudoku grid plus the player-facing board
//! with cells removed. Validity is structural: the solved grid is the
//! base Latin pattern composed with band/offset/label shuffles, each of
//! which preserves row, column, and box constraints. No backtracking,
//! bounded time.

use serde::{Deserialize, Serialize};

use crate::core::rng::DeterministicRng;

/// Side length of a sub-grid box.
pub const SUB_GRID_SIZE: usize = 3;

/// Side length of the full grid.
pub const GRID_SIZE: usize = SUB_GRID_SIZE * SUB_GRID_SIZE;

/// Default number of cells removed from the solved grid.
pub const DEFAULT_HOLES: usize = 10;

/// A 9x9 grid of cell values, row-major (`board[y][x]`). `0` = empty.
pub type Board = [[u8; GRID_SIZE]; GRID_SIZE];

/// A generated puzzle: the player-facing board and its solution.
///
/// Invariant: `board` equals `solution` except at the removed cells,
/// which hold `0`. The solution never contains `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Board with `holes` cells zeroed.
    pub board: Board,
    /// Fully solved grid.
    pub solution: Board,
}

/// Base Latin-square pattern.
///
/// `f(r, c) = (3*(r mod 3) + r/3 + c) mod 9`, valid by construction for
/// any row/column relabeling that stays within bands.
#[inline]
fn pattern(row: usize, col: usize) -> usize {
    (SUB_GRID_SIZE * (row % SUB_GRID_SIZE) + row / SUB_GRID_SIZE + col) % GRID_SIZE
}

/// Shuffle the three bands and, independently, the three offsets inside
/// each band. Returns the composed index permutation.
fn shuffled_axis(rng: &mut DeterministicRng) -> [usize; GRID_SIZE] {
    let mut bands = [0usize, 1, 2];
    rng.shuffle(&mut bands);

    let mut axis = [0usize; GRID_SIZE];
    let mut i = 0;
    for &band in &bands {
        let mut offsets = [0usize, 1, 2];
        rng.shuffle(&mut offsets);
        for &off in &offsets {
            axis[i] = band * SUB_GRID_SIZE + off;
            i += 1;
        }
    }
    axis
}

/// Generate a puzzle with `holes` cells removed.
///
/// The removed coordinates are chosen uniformly without replacement.
/// `holes` is clamped to the cell count.
pub fn generate(rng: &mut DeterministicRng, holes: usize) -> Puzzle {
    let rows = shuffled_axis(rng);
    let cols = shuffled_axis(rng);

    let mut labels = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
    rng.shuffle(&mut labels);

    let mut solution: Board = [[0; GRID_SIZE]; GRID_SIZE];
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            solution[r][c] = labels[pattern(rows[r], cols[c])];
        }
    }

    let mut board = solution;
    let mut positions: Vec<(usize, usize)> = (0..GRID_SIZE)
        .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
        .collect();
    rng.shuffle(&mut positions);

    for &(x, y) in positions.iter().take(holes.min(positions.len())) {
        board[y][x] = 0;
    }

    Puzzle { board, solution }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Assert every row, column, and box of `grid` is a permutation of 1..=9.
    fn assert_valid_solution(grid: &Board) {
        for y in 0..GRID_SIZE {
            let mut row = grid[y];
            row.sort_unstable();
            assert_eq!(row, [1, 2, 3, 4, 5, 6, 7, 8, 9], "row {} invalid", y);
        }

        for x in 0..GRID_SIZE {
            let mut col: Vec<u8> = (0..GRID_SIZE).map(|y| grid[y][x]).collect();
            col.sort_unstable();
            assert_eq!(col, vec![1, 2, 3, 4, 5, 6, 7, 8, 9], "col {} invalid", x);
        }

        for by in 0..SUB_GRID_SIZE {
            for bx in 0..SUB_GRID_SIZE {
                let mut boxed: Vec<u8> = (0..GRID_SIZE)
                    .map(|i| {
                        grid[by * SUB_GRID_SIZE + i / SUB_GRID_SIZE]
                            [bx * SUB_GRID_SIZE + i % SUB_GRID_SIZE]
                    })
                    .collect();
                boxed.sort_unstable();
                assert_eq!(
                    boxed,
                    vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
                    "box ({}, {}) invalid",
                    bx,
                    by
                );
            }
        }
    }

    #[test]
    fn test_pattern_base_grid_is_valid() {
        // The unshuffled pattern already satisfies all constraints.
        let mut grid: Board = [[0; GRID_SIZE]; GRID_SIZE];
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                grid[r][c] = pattern(r, c) as u8 + 1;
            }
        }
        assert_valid_solution(&grid);
    }

    #[test]
    fn test_generate_solution_valid() {
        let mut rng = DeterministicRng::new(42);
        let puzzle = generate(&mut rng, DEFAULT_HOLES);
        assert_valid_solution(&puzzle.solution);
    }

    #[test]
    fn test_generate_hole_count() {
        let mut rng = DeterministicRng::new(7);
        let puzzle = generate(&mut rng, DEFAULT_HOLES);

        let mut zeroed = 0;
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                if puzzle.board[y][x] == 0 {
                    zeroed += 1;
                    assert_ne!(puzzle.solution[y][x], 0);
                } else {
                    assert_eq!(puzzle.board[y][x], puzzle.solution[y][x]);
                }
            }
        }
        assert_eq!(zeroed, DEFAULT_HOLES);
    }

    #[test]
    fn test_generate_deterministic() {
        let mut rng1 = DeterministicRng::new(555);
        let mut rng2 = DeterministicRng::new(555);

        assert_eq!(generate(&mut rng1, 10), generate(&mut rng2, 10));
    }

    #[test]
    fn test_generate_holes_clamped() {
        let mut rng = DeterministicRng::new(3);
        let puzzle = generate(&mut rng, 200);

        // Every cell removed, none out of bounds
        for row in &puzzle.board {
            assert!(row.iter().all(|&v| v == 0));
        }
    }

    proptest! {
        #[test]
        fn prop_solution_valid_for_any_seed(seed in any::<u64>(), holes in 0usize..81) {
            let mut rng = DeterministicRng::new(seed);
            let puzzle = generate(&mut rng, holes);

            assert_valid_solution(&puzzle.solution);

            let zeroed = puzzle
                .board
                .iter()
                .flatten()
                .filter(|&&v| v == 0)
                .count();
            prop_assert_eq!(zeroed, holes);
        }
    }
}
