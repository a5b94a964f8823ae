//! SimWorld - the simulation harness container.

use crate::bomb::SimBomb;
use crate::error::SimError;
use crate::exporter::{TraceEntry, TraceKind};
use crate::host::RecordingHost;
use crate::oracle::SolutionOracle;
use crate::player::Action;

use blackhole_core::{BlackHoleModule, GestureSet, ModuleConfig, PuzzleRegistry, SubmitOutcome, MODULE_NAME};
use blackhole_env::{BombInfo, Edgework, SerialNumber};
use std::sync::Arc;
use tracing::debug;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Rule seed for puzzle generation
    pub seed: u64,

    /// Seed for player fumbles (independent of the rule seed)
    pub player_seed: u64,

    /// Number of Black Hole modules on the bomb
    pub num_modules: usize,

    /// Number of unrelated modules on the bomb
    pub other_modules: usize,

    /// Bomb serial number
    pub serial: String,

    /// Ports, indicators, batteries, holders
    pub edgework: Edgework,

    /// Probability that a player over-holds a press
    pub fumble_rate: f64,

    /// Tick budget before a run is abandoned
    pub max_ticks: u64,

    /// Per-module tunables
    pub module: ModuleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            player_seed: 0x9e3779b97f4a7c15,
            num_modules: 1,
            other_modules: 0,
            serial: "AB3C5D".to_string(),
            edgework: Edgework::default(),
            fumble_rate: 0.0,
            max_ticks: 10_000,
            module: ModuleConfig::default(),
        }
    }
}

/// A module together with the host it reports to.
pub struct SimModule {
    pub module: BlackHoleModule<SimBomb, RecordingHost>,
    pub host: Arc<RecordingHost>,
}

/// The SimWorld - one bomb and all of its Black Hole modules.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared-state registry the modules attached through
    pub registry: PuzzleRegistry,

    /// The simulated bomb
    pub bomb: Arc<SimBomb>,

    /// Modules, in start-up order
    pub modules: Vec<SimModule>,

    /// Ground truth reader
    pub oracle: SolutionOracle,

    trace: Vec<TraceEntry>,
    tick_count: u64,
}

impl SimWorld {
    /// Builds the bomb and starts every module on it.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        if config.num_modules == 0 {
            return Err(SimError::InvalidConfig("at least one module is required".to_string()));
        }
        if config.module.digits_per_module == 0 {
            return Err(SimError::InvalidConfig("digits_per_module must be positive".to_string()));
        }

        let serial = SerialNumber::parse(&config.serial)?;
        let bomb = Arc::new(SimBomb::new(
            serial,
            config.edgework,
            config.seed,
            config.num_modules,
            config.other_modules,
        ));

        let registry = PuzzleRegistry::new();
        let modules: Vec<SimModule> = (0..config.num_modules)
            .map(|_| {
                let host = Arc::new(RecordingHost::new());
                let module = BlackHoleModule::new(
                    &registry,
                    Arc::clone(&bomb),
                    Arc::clone(&host),
                    config.module.clone(),
                );
                SimModule { module, host }
            })
            .collect();

        let oracle = SolutionOracle::new(Arc::clone(modules[0].module.puzzle()));

        Ok(Self {
            config,
            registry,
            bomb,
            modules,
            oracle,
            trace: Vec::new(),
            tick_count: 0,
        })
    }

    /// Delivers one clock tick to every module.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        let before = self.oracle.progress().expected_total;

        for index in 0..self.modules.len() {
            self.apply(index, Action::Tick);
        }

        let after = self.oracle.progress().expected_total;
        if after != before {
            self.record(0, TraceKind::Reduction { from: before, to: after });
        }
    }

    /// Applies one player action to one module.
    ///
    /// `Action::Tick` here reaches only that module; use [`SimWorld::tick`]
    /// to advance the clock for the whole bomb.
    pub fn apply(&mut self, index: usize, action: Action) -> Option<SubmitOutcome> {
        let sim = &mut self.modules[index];
        let strikes_before = sim.host.strike_count();
        let outcome = match action {
            Action::Press => sim.module.on_press(),
            Action::Release => sim.module.on_release(),
            Action::Tick => sim.module.on_tick(),
        };
        let invalid_gesture = outcome.is_none() && sim.host.strike_count() > strikes_before;
        let id = sim.module.id().0;

        if invalid_gesture {
            self.record(id, TraceKind::InvalidGesture);
        }
        if let Some(outcome) = outcome {
            self.record_outcome(id, outcome);
        }
        outcome
    }

    /// Marks the next unrelated module solved.
    pub fn solve_other_module(&mut self) -> Option<String> {
        let name = self.bomb.solve_other_module()?;
        self.record(0, TraceKind::OtherModuleSolved { name: name.clone() });
        Some(name)
    }

    fn record_outcome(&mut self, module: u32, outcome: SubmitOutcome) {
        let kind = match outcome {
            SubmitOutcome::Correct { position, solved } => {
                let digit = self.oracle.solution()[position];
                self.record(module, TraceKind::Correct { position, digit });
                if !solved {
                    return;
                }
                self.bomb.record_solved(MODULE_NAME);
                TraceKind::Solved
            }
            SubmitOutcome::Incorrect {
                position,
                expected,
                entered,
            } => TraceKind::Incorrect {
                position,
                expected,
                entered,
            },
            SubmitOutcome::Query { entered_total } => TraceKind::Query { entered_total },
        };
        self.record(module, kind);
    }

    fn record(&mut self, module: u32, kind: TraceKind) {
        debug!("  tick={} | module={} | {:?}", self.tick_count, module, kind);
        self.trace.push(TraceEntry {
            tick: self.tick_count,
            module,
            kind,
        });
    }

    /// Gestures in play on this bomb.
    pub fn gestures(&self) -> &GestureSet {
        &self.modules[0].module.generated().gestures
    }

    /// Index of the first unsolved module, if any.
    pub fn first_unsolved(&self) -> Option<usize> {
        self.modules.iter().position(|m| !m.module.is_solved())
    }

    /// Indices of every unsolved module.
    pub fn unsolved(&self) -> Vec<usize> {
        (0..self.modules.len())
            .filter(|&i| !self.modules[i].module.is_solved())
            .collect()
    }

    pub fn all_solved(&self) -> bool {
        self.modules.iter().all(|m| m.module.is_solved())
    }

    /// Strikes across every module.
    pub fn strikes(&self) -> usize {
        self.modules.iter().map(|m| m.host.strike_count()).sum()
    }

    /// Passes across every module.
    pub fn passes(&self) -> usize {
        self.modules.iter().map(|m| m.host.pass_count()).sum()
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Serial number of the bomb.
    pub fn serial(&self) -> String {
        self.bomb.serial_number().to_string()
    }
}
