//! Black Hole Core - logic of a cooperative, gesture-driven bomb module
//!
//! This library solves the three hard parts of the module:
//! 1. **Sequence Problem**: a seed- and edgework-driven walk over a fixed grid
//!    that yields one long solution shared by every Black Hole on a bomb
//! 2. **Input Problem**: an event-stream recognizer that turns press,
//!    release and clock-tick events into digits
//! 3. **Sharing Problem**: one serialized puzzle record per bomb that several
//!    module instances read and advance
//!
//! # Architecture
//!
//! ```text
//!  press/release/tick                       BombInfo (edgework, seed)
//!         │                                        │
//!  ┌──────▼─────────┐   digit   ┌──────────────┐   │  once per bomb
//!  │   Recognizer   ├──────────►│  Submission  │◄──┴── Generator
//!  └────────────────┘           └──────┬───────┘
//!                                      │ lock
//!                               ┌──────▼───────┐
//!                               │ SharedPuzzle │  (one per BombId)
//!                               └──────────────┘
//! ```

pub mod config;
pub mod generator;
pub mod gestures;
pub mod grid;
pub mod module;
pub mod recognizer;
pub mod shared;
pub mod strike;

// Re-export key types for convenience
pub use config::ModuleConfig;
pub use generator::{derive_rules, generate, RuleSet, WalkConfig};
pub use gestures::{Event, Gesture, GestureSet, Template};
pub use module::{BlackHoleModule, SubmitOutcome, MODULE_NAME};
pub use recognizer::{GestureRecognizer, Recognition};
pub use shared::{GeneratedPuzzle, InstanceId, Progress, PuzzleRegistry, SharedPuzzle};
pub use strike::StrikeReason;
