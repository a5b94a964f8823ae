//! Black Hole Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" boundary between the Black Hole logic
//! core and whatever hosts it: a real bomb, or the deterministic simulator.
//!
//! # Core Concept
//!
//! Everything the core observes or signals goes through a trait:
//! - The bomb (`serial_number()`, `edgework()`, module lists)
//! - The host (`report_strike()`, `report_pass()`, `show_progress()`)
//! - Randomness (`rule_stream()`)
//!
//! All puzzle entropy is derived from the rule seed, so any generated
//! puzzle is reproducible from the seed and the bomb's edgework.
//!
//! # Example
//!
//! ```ignore
//! use blackhole_env::{BombInfo, RuleStream};
//!
//! fn first_draw<B: BombInfo>(bomb: &B) -> i32 {
//!     let mut stream = bomb.rule_stream();
//!     stream.next_range(0, 100)
//! }
//! ```

mod bomb;
mod host;
mod types;
mod error;
mod rule_stream;

pub use bomb::BombInfo;
pub use host::ModuleHost;
pub use types::{BombId, Edgework, SerialNumber};
pub use error::EnvError;
pub use rule_stream::{ChaChaRuleStream, RuleStream, DEFAULT_RULE_SEED};
