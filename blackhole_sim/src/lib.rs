//! Black Hole Deterministic Simulation Harness
//!
//! This crate provides a controlled bomb on which any number of Black Hole
//! modules run deterministically, driven by scripted players.
//!
//! # Core Principle
//!
//! All sources of non-determinism are controlled:
//! - **Time**: ticks are delivered by the world, one at a time
//! - **Input**: players replay gesture templates as press/release/tick
//! - **Randomness**: puzzle entropy from the rule seed, player fumbles from
//!   a separate player seed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SimBomb (serial, edgework, solved modules, seed)     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼────┐              ┌────▼────┐                       │
//! │  │ Module  │◄────────────►│ Module  │     ...               │
//! │  │   #1    │ SharedPuzzle │   #2    │                       │
//! │  └────▲────┘              └────▲────┘                       │
//! │       │   press/release        │                            │
//! │  ┌────┴────────────────────────┴────┐                       │
//! │  │  ScriptedPlayer + SolutionOracle │                       │
//! │  └──────────────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use blackhole_sim::{SimWorld, SimConfig};
//!
//! let config = SimConfig {
//!     seed: 42,
//!     num_modules: 2,
//!     ..Default::default()
//! };
//!
//! let mut world = SimWorld::new(config)?;
//! world.tick();
//! ```

mod bomb;
mod error;
mod exporter;
mod host;
mod oracle;
mod player;
mod runner;
mod world;
pub mod scenarios;

pub use bomb::SimBomb;
pub use error::SimError;
pub use exporter::{SimExport, TraceEntry, TraceKind};
pub use host::RecordingHost;
pub use oracle::SolutionOracle;
pub use player::{Action, ScriptedPlayer};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimModule, SimWorld};
