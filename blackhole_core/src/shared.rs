//! Shared puzzle state - one serialized record per bomb.
//!
//! Every Black Hole on a bomb holds an `Arc<SharedPuzzle>` obtained from the
//! [`PuzzleRegistry`]. All reads and writes of the shared cursor, the
//! expected total and the generated solution happen under one mutex, so no
//! module can observe a half-finished generation or reduction.

use crate::gestures::GestureSet;
use crate::generator::RuleSet;
use blackhole_env::BombId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifier of one module instance, unique within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The immutable output of the one generation pass for a bomb.
#[derive(Debug, Clone)]
pub struct GeneratedPuzzle {
    /// The full digit sequence all modules on the bomb enter together
    pub solution: Vec<u8>,

    /// Gestures in play on this bomb
    pub gestures: GestureSet,

    /// Seeded decisions that produced the walk and the gestures
    pub rules: RuleSet,

    /// Black Hole modules on the bomb at generation time
    pub instance_count: usize,
}

/// Snapshot of the mutable part of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Digits accepted across all modules (the shared cursor)
    pub entered_total: usize,

    /// Digits the bomb currently requires
    pub expected_total: usize,

    /// Module that most recently advanced the cursor, if not yet penalized
    pub last_advancing: Option<InstanceId>,
}

/// Result of checking one digit against the shared cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved past `position`
    Correct { position: usize },
    /// Cursor unchanged
    Incorrect { position: usize, expected: u8 },
}

/// A shrink of the expected total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Default)]
struct PuzzleState {
    generated: Option<Arc<GeneratedPuzzle>>,
    entered_total: usize,
    expected_total: usize,
    last_advancing: Option<InstanceId>,
    generations: usize,
}

/// Shared record for all Black Hole modules on one bomb.
#[derive(Debug)]
pub struct SharedPuzzle {
    bomb_id: BombId,
    state: Mutex<PuzzleState>,
}

impl SharedPuzzle {
    pub fn new(bomb_id: BombId) -> Self {
        Self {
            bomb_id,
            state: Mutex::new(PuzzleState::default()),
        }
    }

    pub fn bomb_id(&self) -> BombId {
        self.bomb_id
    }

    /// Returns the generated puzzle, running `generate` if nobody has yet.
    ///
    /// The lock is held across `generate`: concurrent callers wait and then
    /// read the finished result. The expected total starts at the solution
    /// length.
    pub fn get_or_generate<F>(&self, generate: F) -> Arc<GeneratedPuzzle>
    where
        F: FnOnce() -> GeneratedPuzzle,
    {
        let mut state = self.lock();
        if let Some(generated) = &state.generated {
            return Arc::clone(generated);
        }

        let generated = Arc::new(generate());
        state.expected_total = generated.solution.len();
        state.generations += 1;
        state.generated = Some(Arc::clone(&generated));
        generated
    }

    /// Returns the generated puzzle, if generation has run.
    pub fn generated(&self) -> Option<Arc<GeneratedPuzzle>> {
        self.lock().generated.clone()
    }

    /// Number of generation passes executed (0 or 1).
    pub fn generation_count(&self) -> usize {
        self.lock().generations
    }

    pub fn progress(&self) -> Progress {
        let state = self.lock();
        Progress {
            entered_total: state.entered_total,
            expected_total: state.expected_total,
            last_advancing: state.last_advancing,
        }
    }

    /// Checks `digit` against the solution at the cursor and advances on a
    /// match, recording `instance` as the last advancing module.
    ///
    /// # Panics
    /// If the puzzle has not been generated or is already complete.
    pub fn submit(&self, instance: InstanceId, digit: u8) -> Advance {
        let mut state = self.lock();
        let position = state.entered_total;
        let expected = {
            let generated = state
                .generated
                .as_ref()
                .expect("digit submitted before the puzzle was generated");
            assert!(
                position < generated.solution.len(),
                "digit submitted after the solution was complete"
            );
            generated.solution[position]
        };

        if digit == expected {
            state.entered_total += 1;
            state.last_advancing = Some(instance);
            Advance::Correct { position }
        } else {
            Advance::Incorrect { position, expected }
        }
    }

    /// Shrinks the expected total by `amount` if `instance` made the last
    /// advance, never below one more than the digits already entered.
    ///
    /// `amount` is what the module's own cap gave up, so the expected total
    /// stays the sum of the local caps. Clears the last advancing module, so
    /// one advance pays for at most one reduction.
    pub fn reduce_expected(&self, instance: InstanceId, amount: usize) -> Option<Reduction> {
        let mut state = self.lock();
        if state.last_advancing != Some(instance) {
            return None;
        }
        state.last_advancing = None;

        let from = state.expected_total;
        let to = reduced_cap(from, state.entered_total, amount);
        state.expected_total = to;
        Some(Reduction { from, to })
    }

    fn lock(&self) -> MutexGuard<'_, PuzzleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `cap - step`, floored at `entered + 1`, and never above `cap`.
pub fn reduced_cap(cap: usize, entered: usize, step: usize) -> usize {
    cap.saturating_sub(step).max(entered + 1).min(cap)
}

/// Maps bomb identities to their shared puzzles.
///
/// `attach` creates the record on first use; `teardown` drops it when the
/// bomb is solved or explodes. Modules keep their own `Arc`, so a teardown
/// never pulls state out from under a running module.
#[derive(Debug)]
pub struct PuzzleRegistry {
    puzzles: Mutex<HashMap<BombId, Arc<SharedPuzzle>>>,
    next_instance: AtomicU32,
}

impl PuzzleRegistry {
    pub fn new() -> Self {
        Self {
            puzzles: Mutex::new(HashMap::new()),
            next_instance: AtomicU32::new(1),
        }
    }

    /// Issues an instance id and returns the bomb's shared puzzle,
    /// creating it if absent.
    pub fn attach(&self, bomb_id: BombId) -> (InstanceId, Arc<SharedPuzzle>) {
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed));
        let puzzle = Arc::clone(
            self.lock()
                .entry(bomb_id)
                .or_insert_with(|| Arc::new(SharedPuzzle::new(bomb_id))),
        );
        (id, puzzle)
    }

    /// Returns the shared puzzle for a bomb, if one is registered.
    pub fn get(&self, bomb_id: BombId) -> Option<Arc<SharedPuzzle>> {
        self.lock().get(&bomb_id).cloned()
    }

    /// Forgets a bomb. Returns whether it was registered.
    pub fn teardown(&self, bomb_id: BombId) -> bool {
        self.lock().remove(&bomb_id).is_some()
    }

    /// Number of bombs with live puzzles.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BombId, Arc<SharedPuzzle>>> {
        self.puzzles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PuzzleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{derive_rules, generate};
    use blackhole_env::{ChaChaRuleStream, Edgework, SerialNumber, DEFAULT_RULE_SEED};
    use proptest::prelude::*;

    fn bomb_id() -> BombId {
        BombId::from_serial(&SerialNumber::parse("AB3C5D").unwrap())
    }

    fn canonical_puzzle(instance_count: usize) -> GeneratedPuzzle {
        let serial = SerialNumber::parse("AB3C5D").unwrap();
        let rules = derive_rules(
            &mut ChaChaRuleStream::new(DEFAULT_RULE_SEED),
            &serial,
            &Edgework::default(),
            true,
        );
        GeneratedPuzzle {
            solution: generate(&rules.walk, 7 * instance_count),
            gestures: rules.gestures.clone(),
            rules,
            instance_count,
        }
    }

    #[test]
    fn test_generation_runs_once() {
        let puzzle = SharedPuzzle::new(bomb_id());
        let a = puzzle.get_or_generate(|| canonical_puzzle(2));
        let b = puzzle.get_or_generate(|| panic!("generated twice"));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(puzzle.generation_count(), 1);
        assert_eq!(puzzle.progress().expected_total, 14);
    }

    #[test]
    fn test_concurrent_generation_runs_once() {
        let puzzle = SharedPuzzle::new(bomb_id());
        let solutions: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| puzzle.get_or_generate(|| canonical_puzzle(3)).solution.clone()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(puzzle.generation_count(), 1);
        assert!(solutions.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_submit_advances_only_on_match() {
        let puzzle = SharedPuzzle::new(bomb_id());
        puzzle.get_or_generate(|| canonical_puzzle(1));

        // Canonical solution starts 1, 3
        assert_eq!(
            puzzle.submit(InstanceId(1), 0),
            Advance::Incorrect { position: 0, expected: 1 }
        );
        assert_eq!(puzzle.progress().entered_total, 0);
        assert_eq!(puzzle.progress().last_advancing, None);

        assert_eq!(puzzle.submit(InstanceId(1), 1), Advance::Correct { position: 0 });
        assert_eq!(puzzle.submit(InstanceId(2), 3), Advance::Correct { position: 1 });
        let progress = puzzle.progress();
        assert_eq!(progress.entered_total, 2);
        assert_eq!(progress.last_advancing, Some(InstanceId(2)));
    }

    #[test]
    #[should_panic]
    fn test_submit_before_generation_panics() {
        SharedPuzzle::new(bomb_id()).submit(InstanceId(1), 0);
    }

    #[test]
    fn test_reduce_only_for_last_advancing() {
        let puzzle = SharedPuzzle::new(bomb_id());
        puzzle.get_or_generate(|| canonical_puzzle(2));
        puzzle.submit(InstanceId(1), 1);

        assert_eq!(puzzle.reduce_expected(InstanceId(2), 2), None);
        assert_eq!(
            puzzle.reduce_expected(InstanceId(1), 2),
            Some(Reduction { from: 14, to: 12 })
        );
        // Penalty fires once per advance
        assert_eq!(puzzle.reduce_expected(InstanceId(1), 2), None);
        assert_eq!(puzzle.progress().expected_total, 12);
    }

    #[test]
    fn test_reduced_cap_floor() {
        assert_eq!(reduced_cap(7, 0, 2), 5);
        assert_eq!(reduced_cap(7, 5, 2), 6);
        assert_eq!(reduced_cap(7, 6, 2), 7);
        assert_eq!(reduced_cap(2, 0, 5), 1);
        // Never grows
        assert_eq!(reduced_cap(7, 7, 2), 7);
    }

    #[test]
    fn test_registry_attach_and_teardown() {
        let registry = PuzzleRegistry::new();
        let (a, pa) = registry.attach(bomb_id());
        let (b, pb) = registry.attach(bomb_id());

        assert_eq!(a, InstanceId(1));
        assert_eq!(b, InstanceId(2));
        assert!(Arc::ptr_eq(&pa, &pb));
        assert_eq!(registry.len(), 1);

        assert!(registry.teardown(bomb_id()));
        assert!(!registry.teardown(bomb_id()));
        assert!(registry.get(bomb_id()).is_none());

        let (_, fresh) = registry.attach(bomb_id());
        assert!(!Arc::ptr_eq(&pa, &fresh));
    }

    proptest! {
        #[test]
        fn prop_cursor_monotonic_and_floor_holds(
            ops in proptest::collection::vec((0u32..3, 0u8..5, any::<bool>()), 0..300),
        ) {
            let puzzle = SharedPuzzle::new(bomb_id());
            let generated = puzzle.get_or_generate(|| canonical_puzzle(3));
            let mut last_entered = 0;

            for (instance, digit, reduce) in ops {
                let id = InstanceId(instance);
                let before = puzzle.progress();
                if reduce {
                    puzzle.reduce_expected(id, 2);
                } else if before.entered_total < before.expected_total {
                    puzzle.submit(id, digit);
                }

                let progress = puzzle.progress();
                prop_assert!(progress.entered_total >= last_entered);
                prop_assert!(progress.expected_total <= generated.solution.len());
                prop_assert!(progress.expected_total >= progress.entered_total);
                if reduce && before.expected_total > before.entered_total {
                    prop_assert!(progress.expected_total >= progress.entered_total + 1);
                }
                last_entered = progress.entered_total;
            }
        }
    }
}
