//! Ground truth oracle for simulation.
//!
//! The oracle reads the shared puzzle directly: the "God's eye view" a
//! real defuser only gets from the manual.

use blackhole_core::{Progress, SharedPuzzle};
use std::sync::Arc;

/// Reads the solution and cursor of one bomb's shared puzzle.
#[derive(Debug, Clone)]
pub struct SolutionOracle {
    puzzle: Arc<SharedPuzzle>,
}

impl SolutionOracle {
    pub fn new(puzzle: Arc<SharedPuzzle>) -> Self {
        Self { puzzle }
    }

    /// The full generated solution (empty before generation).
    pub fn solution(&self) -> Vec<u8> {
        self.puzzle
            .generated()
            .map(|g| g.solution.clone())
            .unwrap_or_default()
    }

    /// The digit the shared cursor expects next, if any remain.
    pub fn next_digit(&self) -> Option<u8> {
        let generated = self.puzzle.generated()?;
        let progress = self.puzzle.progress();
        if progress.entered_total >= progress.expected_total {
            return None;
        }
        generated.solution.get(progress.entered_total).copied()
    }

    pub fn progress(&self) -> Progress {
        self.puzzle.progress()
    }
}
