//! Engine binary for the housing market simulation.
//!
//! Loads configuration, seeds the initial market, runs the tick loop, and
//! reports the outcome through structured logs.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `housing-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Generate the seeded population
//! 4. Run the simulation loop with a metrics collector
//! 5. Log the result

mod error;
mod report;

use std::path::Path;

use housing_core::config::SimulationConfig;
use housing_core::metrics::MetricsCollector;
use housing_core::runner;
use housing_core::tick::SimulationState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "housing-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, population generation, or any tick
/// fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config_found = config_path.exists();
    let config = load_config(config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("housing-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        name = config.world.name,
        seed = config.world.seed,
        max_ticks = config.simulation.max_ticks,
        participants = config.population.participants,
        assets = config.population.assets,
        "Configuration loaded"
    );

    // 3. Generate the population.
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let market = housing_world::generate_market(&config.population, &mut rng)
        .map_err(EngineError::from)?;
    let mut state = SimulationState::new(market, config.market_config());

    // 4. Run the simulation.
    let mut metrics = MetricsCollector::new();
    metrics.record_initial(&state);
    let result = runner::run_simulation(&mut state, config.simulation.max_ticks, &mut metrics)
        .map_err(EngineError::from)?;

    // 5. Log results.
    runner::log_simulation_end(&result);
    report::log_metrics(&metrics);
    report::log_participants(&state.market);
    report::log_snapshot(&state.market)?;

    info!(total_ticks = result.total_ticks, "housing-engine shutdown complete");

    Ok(())
}

/// Load the simulation configuration, falling back to defaults when the
/// file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        return Ok(SimulationConfig::from_file(path)?);
    }
    let mut config = SimulationConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}
