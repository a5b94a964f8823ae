//! Module Runtime - one Black Hole instance attached to a bomb.
//!
//! This module is the integration layer between the pure engines
//! (generator, recognizer, shared puzzle) and the environment abstraction
//! (`BombInfo`, `ModuleHost`).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BlackHoleModule                        │
//! │  on_press() / on_release() / on_tick()                      │
//! │        │                                                    │
//! │  ┌─────▼──────┐  Gesture  ┌────────────┐  lock  ┌────────┐  │
//! │  │ Recognizer ├──────────►│   submit   ├───────►│ Shared │  │
//! │  └────────────┘           └─────┬──────┘        │ Puzzle │  │
//! │                                 │               └────────┘  │
//! │                 report_strike / report_pass / show_progress │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use blackhole_core::{BlackHoleModule, ModuleConfig, PuzzleRegistry};
//!
//! let registry = PuzzleRegistry::new();
//! let mut module = BlackHoleModule::new(&registry, bomb, host, ModuleConfig::default());
//!
//! module.on_press();
//! module.on_tick();
//! module.on_release();
//! ```

use crate::config::ModuleConfig;
use crate::generator::{derive_rules, generate};
use crate::gestures::{Event, Gesture};
use crate::recognizer::{GestureRecognizer, Recognition};
use crate::shared::{reduced_cap, Advance, GeneratedPuzzle, InstanceId, Progress, PuzzleRegistry, SharedPuzzle};
use crate::strike::StrikeReason;
use blackhole_env::{BombInfo, ModuleHost};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Display name of the module on a bomb.
pub const MODULE_NAME: &str = "Black Hole";

/// What a submitted gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The digit matched the shared cursor
    Correct { position: usize, solved: bool },
    /// The digit did not match; a strike was issued
    Incorrect { position: usize, expected: u8, entered: u8 },
    /// Progress was reported; nothing changed
    Query { entered_total: usize },
}

/// A Black Hole module.
///
/// Generic over the bomb and host implementations, so the same module
/// runs on a live bomb or in the simulator.
pub struct BlackHoleModule<B, H>
where
    B: BombInfo,
    H: ModuleHost,
{
    id: InstanceId,
    bomb: Arc<B>,
    host: Arc<H>,
    config: ModuleConfig,
    puzzle: Arc<SharedPuzzle>,
    generated: Arc<GeneratedPuzzle>,
    recognizer: GestureRecognizer,
    digits_entered: usize,
    digits_expected: usize,
    solved: bool,
    others_solved_seen: usize,
}

impl<B, H> BlackHoleModule<B, H>
where
    B: BombInfo,
    H: ModuleHost,
{
    /// Attaches a module to its bomb's shared puzzle, generating the puzzle
    /// if this is the first module to start.
    ///
    /// # Panics
    /// If the bomb lists no Black Hole modules, or `digits_per_module` is 0.
    pub fn new(registry: &PuzzleRegistry, bomb: Arc<B>, host: Arc<H>, config: ModuleConfig) -> Self {
        assert!(config.digits_per_module > 0, "digits_per_module must be positive");

        let (id, puzzle) = registry.attach(bomb.bomb_id());
        let generated = puzzle.get_or_generate(|| generate_puzzle(id, bomb.as_ref(), &config));
        let others_solved_seen = count_other_solved(bomb.as_ref());

        debug!(
            "[{} {}] Attached to bomb {} ({} modules share the puzzle)",
            MODULE_NAME,
            id,
            puzzle.bomb_id(),
            generated.instance_count
        );

        Self {
            id,
            bomb,
            host,
            digits_expected: config.digits_per_module,
            config,
            puzzle,
            generated,
            recognizer: GestureRecognizer::new(),
            digits_entered: 0,
            solved: false,
            others_solved_seen,
        }
    }

    /// Handles the input surface being pressed.
    pub fn on_press(&mut self) -> Option<SubmitOutcome> {
        if self.solved {
            return None;
        }
        let recognition = self.recognizer.press(&self.generated.gestures);
        self.handle(Event::Press, recognition)
    }

    /// Handles the input surface being released.
    pub fn on_release(&mut self) -> Option<SubmitOutcome> {
        if self.solved {
            return None;
        }
        let recognition = self.recognizer.release(&self.generated.gestures);
        self.handle(Event::Release, recognition)
    }

    /// Handles one unit of external clock time.
    ///
    /// Checks for newly solved unrelated modules before the tick reaches the
    /// recognizer.
    pub fn on_tick(&mut self) -> Option<SubmitOutcome> {
        if self.solved {
            return None;
        }
        self.observe_other_solves();
        let recognition = self.recognizer.tick(&self.generated.gestures);
        self.handle(Event::Tick, recognition)
    }

    /// Submits a recognized gesture.
    ///
    /// Returns `None` once the module is solved.
    pub fn submit(&mut self, gesture: Gesture) -> Option<SubmitOutcome> {
        if self.solved {
            return None;
        }

        let outcome = match gesture {
            Gesture::Query => {
                let entered_total = self.puzzle.progress().entered_total;
                info!("[{} {}] Progress query: {} digits entered", MODULE_NAME, self.id, entered_total);
                self.host.show_progress(entered_total);
                SubmitOutcome::Query { entered_total }
            }
            Gesture::Digit(digit) => match self.puzzle.submit(self.id, digit) {
                Advance::Correct { position } => {
                    self.digits_entered += 1;
                    info!(
                        "[{} {}] Entered {} correctly at position {} ({}/{} on this module)",
                        MODULE_NAME, self.id, digit, position, self.digits_entered, self.digits_expected
                    );
                    if self.digits_entered >= self.digits_expected {
                        self.solved = true;
                        info!("[{} {}] Module solved", MODULE_NAME, self.id);
                        self.host.report_pass();
                    }
                    SubmitOutcome::Correct {
                        position,
                        solved: self.solved,
                    }
                }
                Advance::Incorrect { position, expected } => {
                    self.strike(StrikeReason::WrongDigit {
                        position,
                        expected,
                        entered: digit,
                    });
                    SubmitOutcome::Incorrect {
                        position,
                        expected,
                        entered: digit,
                    }
                }
            },
        };

        Some(outcome)
    }

    fn handle(&mut self, event: Event, recognition: Recognition) -> Option<SubmitOutcome> {
        match recognition {
            Recognition::Pending => None,
            Recognition::Rejected => {
                debug!("[{} {}] No gesture after {:?}", MODULE_NAME, self.id, event);
                self.strike(StrikeReason::InvalidGesture);
                None
            }
            Recognition::Matched(gesture) => {
                debug!("[{} {}] Recognized {:?}", MODULE_NAME, self.id, gesture);
                self.submit(gesture)
            }
        }
    }

    fn strike(&mut self, reason: StrikeReason) {
        warn!("[{} {}] Strike: {}", MODULE_NAME, self.id, reason);
        self.recognizer.reset();
        self.host.report_strike(&reason.to_string());
    }

    /// Applies the decrement rule when unrelated modules were solved since
    /// the last tick.
    fn observe_other_solves(&mut self) {
        let solved_now = count_other_solved(self.bomb.as_ref());
        if solved_now <= self.others_solved_seen {
            return;
        }
        self.others_solved_seen = solved_now;

        let local_from = self.digits_expected;
        let local_to = reduced_cap(local_from, self.digits_entered, self.config.decrement_step);
        if let Some(reduction) = self.puzzle.reduce_expected(self.id, local_from - local_to) {
            self.set_digits_expected(local_to);
            info!(
                "[{} {}] Another module was solved. Bomb now needs {} digits (was {}); this module needs {} (was {})",
                MODULE_NAME, self.id, reduction.to, reduction.from, self.digits_expected, local_from
            );
        }
    }

    fn set_digits_expected(&mut self, cap: usize) {
        assert!(
            cap > self.digits_entered,
            "cap {} would not exceed the {} digits already entered",
            cap,
            self.digits_entered
        );
        self.digits_expected = cap;
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Digits this module has accepted.
    pub fn digits_entered(&self) -> usize {
        self.digits_entered
    }

    /// Digits this module must accept to be solved.
    pub fn digits_expected(&self) -> usize {
        self.digits_expected
    }

    /// Advisory figure to draw; not authoritative.
    pub fn candidate_digit(&self) -> usize {
        self.recognizer.candidate_digit()
    }

    pub fn buffer(&self) -> &[Event] {
        self.recognizer.buffer()
    }

    /// Snapshot of the bomb-wide progress.
    pub fn progress(&self) -> Progress {
        self.puzzle.progress()
    }

    pub fn generated(&self) -> &Arc<GeneratedPuzzle> {
        &self.generated
    }

    pub fn puzzle(&self) -> &Arc<SharedPuzzle> {
        &self.puzzle
    }
}

fn count_other_solved<B: BombInfo + ?Sized>(bomb: &B) -> usize {
    bomb.solved_module_names()
        .iter()
        .filter(|name| name.as_str() != MODULE_NAME)
        .count()
}

fn generate_puzzle<B: BombInfo + ?Sized>(id: InstanceId, bomb: &B, config: &ModuleConfig) -> GeneratedPuzzle {
    let instance_count = bomb
        .module_names()
        .iter()
        .filter(|name| name.as_str() == MODULE_NAME)
        .count();
    assert!(instance_count > 0, "bomb lists no {} modules", MODULE_NAME);

    let mut stream = bomb.rule_stream();
    let rules = derive_rules(
        stream.as_mut(),
        bomb.serial_number(),
        &bomb.edgework(),
        config.report_progress,
    );
    let solution = generate(&rules.walk, config.digits_per_module * instance_count);

    info!(
        "[{} {}] Rule seed {}: start {} via {:?}, facing {} (widget {:?}), turning {}",
        MODULE_NAME,
        id,
        stream.seed(),
        rules.walk.start,
        rules.coordinates,
        rules.walk.direction,
        rules.widget,
        if rules.walk.clockwise { "clockwise" } else { "counter-clockwise" }
    );
    for (gesture, template) in rules.gestures.iter() {
        debug!("[{} {}] Gesture {:?} = {}", MODULE_NAME, id, gesture, template);
    }
    info!(
        "[{} {}] Solution for {} modules: {}",
        MODULE_NAME,
        id,
        instance_count,
        solution.iter().map(|d| d.to_string()).collect::<String>()
    );

    GeneratedPuzzle {
        solution,
        gestures: rules.gestures.clone(),
        rules,
        instance_count,
    }
}
