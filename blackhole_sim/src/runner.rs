//! Scenario runner - executes Black Hole simulation scenarios.

use crate::bomb::SimBomb;
use crate::error::SimError;
use crate::exporter::{SimExport, TraceEntry, TraceKind};
use crate::host::RecordingHost;
use crate::player::{Action, ScriptedPlayer};
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld};

use blackhole_core::shared::reduced_cap;
use blackhole_core::{BlackHoleModule, Gesture, ModuleConfig, PuzzleRegistry};
use blackhole_env::{BombInfo, Edgework, SerialNumber};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Barrier;
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Rule seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Serial number of the bomb
    pub serial: String,

    /// Generated solution
    pub solution: Vec<u8>,

    /// Everything the world recorded
    pub trace: Vec<TraceEntry>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

impl ScenarioResult {
    /// Packages the run for JSON export.
    pub fn to_export(&self) -> SimExport {
        SimExport {
            scenario: self.scenario.name().to_string(),
            seed: self.seed,
            serial: self.serial.clone(),
            solution: self.solution.clone(),
            entries: self.trace.clone(),
            passed: self.passed,
            failure_reason: self.failure_reason.clone(),
        }
    }
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioMetrics {
    /// Strikes across all modules
    pub strikes: u64,

    /// Gestures that matched no template
    pub invalid_gestures: u64,

    /// Valid gestures for the wrong digit
    pub wrong_digits: u64,

    /// Progress queries answered
    pub queries: u64,

    /// Expected-total reductions
    pub reductions: u64,

    /// Modules solved
    pub passes: u64,

    /// Shared cursor at the end of the run
    pub digits_entered: usize,

    /// Expected total at the end of the run
    pub expected_total: usize,

    /// Presses the player held too long
    pub fumbles: u64,
}

impl ScenarioMetrics {
    fn collect(world: &SimWorld, player: &ScriptedPlayer) -> Self {
        let count = |f: fn(&TraceKind) -> bool| world.trace().iter().filter(|e| f(&e.kind)).count() as u64;
        let progress = world.oracle.progress();
        Self {
            strikes: world.strikes() as u64,
            invalid_gestures: count(|k| matches!(k, TraceKind::InvalidGesture)),
            wrong_digits: count(|k| matches!(k, TraceKind::Incorrect { .. })),
            queries: count(|k| matches!(k, TraceKind::Query { .. })),
            reductions: count(|k| matches!(k, TraceKind::Reduction { .. })),
            passes: world.passes() as u64,
            digits_entered: progress.entered_total,
            expected_total: progress.expected_total,
            fumbles: player.fumbles(),
        }
    }
}

/// Which module the player works on next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    /// Stay on the first unsolved module
    FirstUnsolved,
    /// Rotate through unsolved modules by shared cursor position
    RoundRobin,
}

/// Runs simulation scenarios.
pub struct ScenarioRunner {
    /// Rule seed
    seed: u64,

    /// Number of Black Hole modules
    num_modules: usize,

    /// Tick budget per scenario
    max_ticks: u64,

    /// Bomb serial number
    serial: String,

    /// Bomb edgework
    edgework: Edgework,

    /// Unrelated modules on the bomb
    other_modules: usize,

    /// Per-module tunables
    module_config: ModuleConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_modules: usize) -> Self {
        Self {
            seed,
            num_modules: num_modules.max(1),
            max_ticks: 10_000,
            serial: SimConfig::default().serial,
            edgework: Edgework::default(),
            other_modules: 0,
            module_config: ModuleConfig::default(),
        }
    }

    /// Sets the bomb the scenarios run on.
    ///
    /// `unrelated_solve` always adds at least one unrelated module.
    pub fn with_bomb(mut self, serial: impl Into<String>, edgework: Edgework, other_modules: usize) -> Self {
        self.serial = serial.into();
        self.edgework = edgework;
        self.other_modules = other_modules;
        self
    }

    /// Sets the tick budget.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = ticks;
        self
    }

    /// Sets the module configuration.
    pub fn with_module_config(mut self, config: ModuleConfig) -> Self {
        self.module_config = config;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        match scenario {
            ScenarioId::Solo => self.run_solo(),
            ScenarioId::Duo => self.run_duo(),
            ScenarioId::Query => self.run_query(),
            ScenarioId::UnrelatedSolve => self.run_unrelated_solve(),
            ScenarioId::Fumble => self.run_fumble(),
            ScenarioId::Stampede => self.run_stampede(),
        }
    }

    fn config(&self, num_modules: usize, fumble_rate: f64) -> SimConfig {
        SimConfig {
            seed: self.seed,
            player_seed: self.seed.wrapping_mul(0x9e3779b97f4a7c15),
            num_modules,
            other_modules: self.other_modules,
            serial: self.serial.clone(),
            edgework: self.edgework,
            fumble_rate,
            max_ticks: self.max_ticks,
            module: self.module_config.clone(),
        }
    }

    fn player(&self, config: &SimConfig) -> Result<ScriptedPlayer, SimError> {
        ScriptedPlayer::new(config.player_seed, config.fumble_rate)
    }

    /// BH-001: Solo - one module, perfect player.
    ///
    /// **Assertion**: solved after exactly `digits_per_module` digits, no strikes.
    fn run_solo(&self) -> Result<ScenarioResult, SimError> {
        let config = self.config(1, 0.0);
        let mut world = SimWorld::new(config.clone())?;
        let mut player = self.player(&config)?;

        self.play(&mut world, &mut player, Turn::FirstUnsolved, None);

        let dpm = self.module_config.digits_per_module;
        let failure = check(&[
            (world.all_solved(), "module not solved within tick budget".to_string()),
            (world.strikes() == 0, format!("{} strikes", world.strikes())),
            (world.passes() == 1, format!("{} passes", world.passes())),
            (
                world.oracle.progress().entered_total == dpm,
                format!("{} digits entered, expected {}", world.oracle.progress().entered_total, dpm),
            ),
        ]);
        Ok(self.finish(ScenarioId::Solo, &world, &player, failure))
    }

    /// BH-002: Duo - modules take turns on the shared cursor.
    ///
    /// **Assertion**: every module solves, the bomb needs `7 × N` digits.
    fn run_duo(&self) -> Result<ScenarioResult, SimError> {
        let n = self.num_modules.max(2);
        let config = self.config(n, 0.0);
        let mut world = SimWorld::new(config.clone())?;
        let mut player = self.player(&config)?;
        let total = n * self.module_config.digits_per_module;

        let initial_total = world.oracle.progress().expected_total;
        self.play(&mut world, &mut player, Turn::RoundRobin, None);

        let progress = world.oracle.progress();
        let failure = check(&[
            (initial_total == total, format!("bomb required {} digits, expected {}", initial_total, total)),
            (world.all_solved(), "not every module solved".to_string()),
            (world.strikes() == 0, format!("{} strikes", world.strikes())),
            (world.passes() == n, format!("{} passes for {} modules", world.passes(), n)),
            (progress.entered_total == total, format!("{} digits entered", progress.entered_total)),
        ]);
        Ok(self.finish(ScenarioId::Duo, &world, &player, failure))
    }

    /// BH-003: Query - progress reports leave the cursor alone.
    ///
    /// **Assertion**: reports read 0 then 3, no strikes, module solves.
    fn run_query(&self) -> Result<ScenarioResult, SimError> {
        let config = self.config(1, 0.0);
        let mut world = SimWorld::new(config.clone())?;
        let mut player = self.player(&config)?;

        if world.gestures().template(Gesture::Query).is_none() {
            let failure = Some("query gesture disabled by configuration".to_string());
            return Ok(self.finish(ScenarioId::Query, &world, &player, failure));
        }

        let midpoint = 3.min(self.module_config.digits_per_module - 1);
        perform(&mut world, &mut player, 0, Gesture::Query);
        self.play(&mut world, &mut player, Turn::FirstUnsolved, Some(midpoint));
        perform(&mut world, &mut player, 0, Gesture::Query);
        self.play(&mut world, &mut player, Turn::FirstUnsolved, None);

        let reports = world.modules[0].host.progress_reports();
        let failure = check(&[
            (reports == vec![0, midpoint], format!("progress reports {:?}", reports)),
            (world.strikes() == 0, format!("{} strikes", world.strikes())),
            (world.all_solved(), "module not solved".to_string()),
        ]);
        Ok(self.finish(ScenarioId::Query, &world, &player, failure))
    }

    /// BH-004: UnrelatedSolve - another module solves mid-puzzle.
    ///
    /// **Assertion**: the requirement shrinks once, to the floored value,
    /// and the module solves at the shrunk count.
    fn run_unrelated_solve(&self) -> Result<ScenarioResult, SimError> {
        let config = SimConfig {
            other_modules: self.other_modules.max(1),
            ..self.config(1, 0.0)
        };
        let mut world = SimWorld::new(config.clone())?;
        let mut player = self.player(&config)?;

        let dpm = self.module_config.digits_per_module;
        let midpoint = 3.min(dpm - 1);
        let shrunk = reduced_cap(dpm, midpoint, self.module_config.decrement_step);

        self.play(&mut world, &mut player, Turn::FirstUnsolved, Some(midpoint));
        world.solve_other_module();
        self.play(&mut world, &mut player, Turn::FirstUnsolved, None);

        let progress = world.oracle.progress();
        let failure = check(&[
            (world.all_solved(), "module not solved".to_string()),
            (progress.expected_total == shrunk, format!("bomb requires {}, expected {}", progress.expected_total, shrunk)),
            (progress.entered_total == shrunk, format!("{} digits entered, expected {}", progress.entered_total, shrunk)),
            (world.strikes() == 0, format!("{} strikes", world.strikes())),
        ]);
        Ok(self.finish(ScenarioId::UnrelatedSolve, &world, &player, failure))
    }

    /// BH-005: Fumble - a clumsy player over-holds a quarter of presses.
    ///
    /// **Assertion**: every module still solves within the tick budget and
    /// the shared cursor never moves backwards.
    fn run_fumble(&self) -> Result<ScenarioResult, SimError> {
        let config = self.config(self.num_modules, 0.25);
        let mut world = SimWorld::new(config.clone())?;
        let mut player = self.player(&config)?;

        self.play(&mut world, &mut player, Turn::RoundRobin, None);

        let positions: Vec<usize> = world
            .trace()
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Correct { position, .. } => Some(position),
                _ => None,
            })
            .collect();
        let monotonic = positions.windows(2).all(|w| w[1] == w[0] + 1);

        let failure = check(&[
            (world.all_solved(), format!("unsolved after {} ticks", world.tick_count())),
            (monotonic, "shared cursor skipped or repeated a position".to_string()),
        ]);
        Ok(self.finish(ScenarioId::Fumble, &world, &player, failure))
    }

    /// BH-006: Stampede - modules start concurrently on a thread pool.
    ///
    /// **Assertion**: one generation pass, every module sees the same
    /// solution, instance ids are unique.
    fn run_stampede(&self) -> Result<ScenarioResult, SimError> {
        let n = self.num_modules.max(16);
        let config = self.config(n, 0.0);
        let serial = SerialNumber::parse(&config.serial)?;
        let bomb = Arc::new(SimBomb::new(
            serial.clone(),
            config.edgework,
            self.seed,
            n,
            config.other_modules,
        ));
        let registry = Arc::new(PuzzleRegistry::new());
        let barrier = Arc::new(Barrier::new(n));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()?;

        let started = runtime.block_on(async {
            let handles: Vec<_> = (0..n)
                .map(|_| {
                    let bomb = Arc::clone(&bomb);
                    let registry = Arc::clone(&registry);
                    let barrier = Arc::clone(&barrier);
                    let module_config = self.module_config.clone();
                    tokio::spawn(async move {
                        barrier.wait().await;
                        let module = BlackHoleModule::new(
                            &registry,
                            bomb,
                            Arc::new(RecordingHost::new()),
                            module_config,
                        );
                        (module.id(), module.generated().solution.clone())
                    })
                })
                .collect();

            let mut started = Vec::with_capacity(handles.len());
            for handle in handles {
                started.push(handle.await);
            }
            started
        });

        let mut failures = Vec::new();
        let mut ids = HashSet::new();
        let mut solutions = Vec::new();
        for result in started {
            match result {
                Ok((id, solution)) => {
                    ids.insert(id);
                    solutions.push(solution);
                }
                Err(e) => failures.push(format!("module task failed: {}", e)),
            }
        }

        let puzzle = registry.get(bomb.bomb_id());
        let generations = puzzle.as_ref().map_or(0, |p| p.generation_count());
        let expected_total = puzzle.as_ref().map_or(0, |p| p.progress().expected_total);
        let total = n * self.module_config.digits_per_module;
        let solution = solutions.first().cloned().unwrap_or_default();

        let failure = check(&[
            (failures.is_empty(), failures.join("; ")),
            (generations == 1, format!("{} generation passes", generations)),
            (ids.len() == n, format!("{} distinct ids for {} modules", ids.len(), n)),
            (solutions.iter().all(|s| *s == solution), "modules disagree on the solution".to_string()),
            (expected_total == total, format!("bomb requires {}, expected {}", expected_total, total)),
        ]);

        Ok(ScenarioResult {
            scenario: ScenarioId::Stampede,
            seed: self.seed,
            passed: failure.is_none(),
            total_ticks: 0,
            serial: serial.to_string(),
            solution,
            trace: Vec::new(),
            failure_reason: failure,
            metrics: ScenarioMetrics {
                digits_entered: 0,
                expected_total,
                ..ScenarioMetrics::default()
            },
        })
    }

    /// Plays the oracle's next digits until every module is solved, the
    /// tick budget runs out, or the shared cursor reaches `stop_at`.
    fn play(&self, world: &mut SimWorld, player: &mut ScriptedPlayer, turn: Turn, stop_at: Option<usize>) {
        let mut target = 0;

        while !world.all_solved() && world.tick_count() < world.config.max_ticks {
            if player.is_idle() {
                let entered = world.oracle.progress().entered_total;
                if stop_at.is_some_and(|n| entered >= n) {
                    break;
                }
                let Some(digit) = world.oracle.next_digit() else {
                    break;
                };
                let unsolved = world.unsolved();
                target = match turn {
                    Turn::FirstUnsolved => unsolved[0],
                    Turn::RoundRobin => unsolved[entered % unsolved.len()],
                };
                let Some(template) = world.gestures().template(Gesture::Digit(digit)).cloned() else {
                    break;
                };
                player.plan(&template);
            }

            while let Some(action) = player.next_action() {
                if action == Action::Tick {
                    break;
                }
                world.apply(target, action);
            }
            world.tick();

            if world.tick_count() % 100 == 0 {
                debug!(
                    "  tick={} | entered={} | strikes={}",
                    world.tick_count(),
                    world.oracle.progress().entered_total,
                    world.strikes()
                );
            }
        }
    }

    fn finish(
        &self,
        scenario: ScenarioId,
        world: &SimWorld,
        player: &ScriptedPlayer,
        failure_reason: Option<String>,
    ) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_ticks: world.tick_count(),
            serial: world.serial(),
            solution: world.oracle.solution(),
            trace: world.trace().to_vec(),
            failure_reason,
            metrics: ScenarioMetrics::collect(world, player),
        }
    }
}

/// Plays a single gesture on one module, ticking the whole bomb as needed.
fn perform(world: &mut SimWorld, player: &mut ScriptedPlayer, target: usize, gesture: Gesture) {
    let Some(template) = world.gestures().template(gesture).cloned() else {
        return;
    };
    player.plan(&template);
    while let Some(action) = player.next_action() {
        match action {
            Action::Tick => world.tick(),
            action => {
                world.apply(target, action);
            }
        }
    }
}

/// Returns the first failed check's message.
fn check(checks: &[(bool, String)]) -> Option<String> {
    checks
        .iter()
        .find(|(ok, _)| !ok)
        .map(|(_, reason)| reason.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass_canonical_seed() {
        let runner = ScenarioRunner::new(1, 2);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario).unwrap();
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
        }
    }

    #[test]
    fn test_solo_canonical_solution() {
        let result = ScenarioRunner::new(1, 1).run(ScenarioId::Solo).unwrap();
        assert_eq!(result.solution, vec![1, 3, 3, 2, 2, 1, 3]);
        assert_eq!(result.metrics.digits_entered, 7);
        assert_eq!(result.metrics.strikes, 0);
    }

    #[test]
    fn test_unrelated_solve_records_reduction() {
        let result = ScenarioRunner::new(1, 1).run(ScenarioId::UnrelatedSolve).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.reductions, 1);
        assert_eq!(result.metrics.expected_total, 5);
        assert!(result
            .trace
            .iter()
            .any(|e| e.kind == TraceKind::Reduction { from: 7, to: 5 }));
    }

    #[test]
    fn test_fumble_counts_strikes() {
        let result = ScenarioRunner::new(1, 2).run(ScenarioId::Fumble).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(
            result.metrics.strikes,
            result.metrics.invalid_gestures + result.metrics.wrong_digits
        );
    }

    #[test]
    fn test_scenarios_pass_with_widgets_and_other_modules() {
        let runner = ScenarioRunner::new(0, 2).with_bomb("AB3C5D", Edgework::new(2, 1, 3, 2), 3);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario).unwrap();
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
        }

        // batteries + ports turn the seed-0 walk from east to north-west
        let solo = runner.run(ScenarioId::Solo).unwrap();
        assert_eq!(solo.solution, vec![2, 0, 3, 1, 3, 0, 1]);
    }

    #[test]
    fn test_tick_budget_reaches_world() {
        let result = ScenarioRunner::new(1, 1)
            .with_max_ticks(5)
            .run(ScenarioId::Solo)
            .unwrap();
        assert!(!result.passed);
        assert_eq!(result.total_ticks, 5);
    }

    #[test]
    fn test_query_disabled_fails_cleanly() {
        let config = ModuleConfig {
            report_progress: false,
            ..ModuleConfig::default()
        };
        let result = ScenarioRunner::new(1, 1)
            .with_module_config(config)
            .run(ScenarioId::Query)
            .unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn test_export_carries_trace() {
        let result = ScenarioRunner::new(5, 2).run(ScenarioId::Duo).unwrap();
        let export = result.to_export();
        assert_eq!(export.scenario, "duo");
        assert_eq!(export.entries.len(), result.trace.len());
        assert_eq!(export.solution.len(), 14);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_perfect_players_solve_any_seed(seed in any::<u64>(), modules in 1usize..4) {
            let result = ScenarioRunner::new(seed, modules).run(ScenarioId::Duo).unwrap();
            prop_assert!(result.passed, "{:?}", result.failure_reason);
            prop_assert_eq!(result.metrics.strikes, 0);
        }

        #[test]
        fn prop_same_seed_same_run(seed in any::<u64>()) {
            let a = ScenarioRunner::new(seed, 2).run(ScenarioId::Fumble).unwrap();
            let b = ScenarioRunner::new(seed, 2).run(ScenarioId::Fumble).unwrap();
            prop_assert_eq!(a.solution, b.solution);
            prop_assert_eq!(a.trace, b.trace);
        }
    }
}
