//! Headless engine binary for the Commons simulation.
//!
//! Loads configuration, builds the initial population, and runs the tick
//! loop until a termination condition is met. Encounters are drawn at
//! random, since there is no spatial front-end to report them.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `commons-config.yaml` (or `$COMMONS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation and inject the initial founders
//! 4. Create operator state from simulation bounds, hook Ctrl-C to stop
//! 5. Run the simulation loop
//! 6. Log the result and print the final status as JSON

mod encounters;
mod error;
mod stats_callback;

use std::sync::Arc;

use commons_core::config::config_path_from_env;
use commons_core::{OperatorState, Simulation, SimulationConfig, runner};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::encounters::RandomEncounters;
use crate::error::EngineError;
use crate::stats_callback::StatsLogger;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, initialization, or the simulation
/// itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = config_path_from_env();
    let config_found = config_path.exists();
    let config = if config_found {
        SimulationConfig::from_file(&config_path)?
    } else {
        SimulationConfig::default()
    };

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .with_target(true)
        .init();

    info!("commons-engine starting");
    if config_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        initial_agents = config.population.initial_agents,
        "Configuration resolved"
    );

    // 3. Build the simulation.
    let mut simulation = Simulation::new(&config)?;

    // 4. Operator state and Ctrl-C handling.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        min_population = operator.min_population(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current tick");
                    operator.request_stop();
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C, interrupt disabled");
                }
            }
        });
    }

    // 5. Run the simulation.
    let mut encounters = RandomEncounters::new(
        config.world.seed.wrapping_add(1),
        config.simulation.random_encounters_per_tick,
    );
    let mut callback = StatsLogger::new(config.logging.stats_interval);
    let result =
        runner::run_simulation(&mut simulation, &mut encounters, &operator, &mut callback).await?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    let status = operator
        .status(
            simulation.tick_number(),
            simulation.population_size(),
            simulation.agents_created(),
        )
        .await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "commons-engine shutdown complete"
    );

    Ok(())
}
