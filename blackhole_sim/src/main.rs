//! Black Hole DST Simulator CLI
//!
//! Run deterministic simulation scenarios against the Black Hole module.

use blackhole_core::ModuleConfig;
use blackhole_env::Edgework;
use blackhole_sim::scenarios::ScenarioId;
use blackhole_sim::{ScenarioResult, ScenarioRunner, SimError};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Black Hole Deterministic Simulation Testing CLI
#[derive(Parser, Debug)]
#[command(name = "blackhole-sim")]
#[command(about = "Run deterministic simulation tests for the Black Hole module", long_about = None)]
struct Args {
    /// Rule seed (0 = random from time, 1 = canonical rules)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of Black Hole modules on the bomb
    #[arg(short, long, default_value = "2")]
    modules: usize,

    /// Scenario to run (solo, duo, query, unrelated_solve, fumble, stampede, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Bomb serial number
    #[arg(long, default_value = "AB3C5D")]
    serial: String,

    /// Bomb edgework as ports,indicators,batteries,holders
    #[arg(long, default_value = "0,0,0,0")]
    edgework: Edgework,

    /// Number of unrelated modules on the bomb
    #[arg(long, default_value = "0")]
    others: usize,

    /// Tick budget per scenario
    #[arg(long, default_value = "10000")]
    max_ticks: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export the scenario trace to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Module configuration JSON file
    #[arg(long)]
    config: Option<String>,
}

fn load_module_config(path: Option<&str>) -> Result<ModuleConfig, SimError> {
    let Some(path) = path else {
        return Ok(ModuleConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: ModuleConfig = serde_json::from_str(&text)?;
    if config.digits_per_module == 0 {
        return Err(SimError::InvalidConfig("digits_per_module must be positive".to_string()));
    }
    Ok(config)
}

fn parse_scenarios(name: &str) -> Result<Vec<ScenarioId>, SimError> {
    if name == "all" {
        return Ok(ScenarioId::all());
    }
    name.parse()
        .map(|id| vec![id])
        .map_err(|_| SimError::UnknownScenario(name.to_string()))
}

fn report(result: &ScenarioResult) {
    if result.passed {
        info!(
            "✓ {} (seed={}) PASSED | ticks={} strikes={} digits={}/{}",
            result.scenario.name(),
            result.seed,
            result.total_ticks,
            result.metrics.strikes,
            result.metrics.digits_entered,
            result.metrics.expected_total
        );
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

fn run(args: &Args) -> Result<usize, SimError> {
    let scenarios = parse_scenarios(&args.scenario)?;
    let module_config = load_module_config(args.config.as_deref())?;

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    // Handle --export mode: one scenario, one seed, full trace on disk
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 || args.seeds > 1 {
            return Err(SimError::InvalidConfig(
                "--export only supports a single scenario and seed".to_string(),
            ));
        }

        let result = ScenarioRunner::new(base_seed, args.modules)
            .with_max_ticks(args.max_ticks)
            .with_bomb(args.serial.as_str(), args.edgework, args.others)
            .with_module_config(module_config)
            .run(scenarios[0])?;
        report(&result);

        let export = result.to_export();
        export.write_to_file(export_path)?;
        info!("Exported {} trace entries to {}", export.entries.len(), export_path);

        return Ok(usize::from(!result.passed));
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed, args.modules)
            .with_max_ticks(args.max_ticks)
            .with_bomb(args.serial.as_str(), args.edgework, args.others)
            .with_module_config(module_config.clone());

        for scenario in &scenarios {
            let result = runner.run(*scenario)?;

            if !args.json {
                report(&result);
            }
            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "strikes": r.metrics.strikes,
                    "digits_entered": r.metrics.digits_entered,
                    "expected_total": r.metrics.expected_total,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    Ok(failed_count)
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Black Hole DST Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    match run(&args) {
        Ok(0) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            if matches!(e, SimError::UnknownScenario(_)) {
                eprintln!("Available scenarios: solo, duo, query, unrelated_solve, fumble, stampede, all");
            }
            std::process::exit(1);
        }
    }
}
