//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks`
//! - **Pause/resume**: operator can halt and continue the tick loop
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Live configuration**: staged tunables take effect at the next tick
//! - **Population recovery**: founders injected on request or below a floor
//! - **Clean shutdown**: operator stop or extinction end the loop
//!
//! The runner wraps the synchronous [`Simulation::tick`] and only awaits
//! between ticks.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::encounter::EncounterSource;
use crate::operator::{OperatorState, SimulationEndReason};
use crate::simulation::{Simulation, SimulationError};
use crate::tick::TickSummary;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick or boundary operation failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to feed a renderer, collect statistics,
/// etc. The callback receives the tick summary and the simulation.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &Simulation) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// Between ticks, in order: wait out a pause, honour a stop request, hand
/// staged tunables to the simulation, inject requested and recovery
/// founders, and poll `encounters` for the next tick's pairs.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick or founder injection fails. A failed
/// tick leaves the simulation halted.
pub async fn run_simulation(
    simulation: &mut Simulation,
    encounters: &mut dyn EncounterSource,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        run_id = %simulation.run_id(),
        max_ticks = operator.max_ticks(),
        min_population = operator.min_population(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.set_end_reason(reason).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Staged configuration ---
        if let Some(tunables) = operator.take_staged_tunables().await
            && let Err(err) = simulation.set_configuration(&tunables)
        {
            debug!(error = %err, "Operator tunables discarded");
        }

        // --- Founders ---
        let requested = operator.take_requested_founders();
        let shortfall = operator.recovery_shortfall(simulation.population_size());
        let founders = requested.max(shortfall);
        if founders > 0 {
            info!(requested, shortfall, "Injecting founders");
            simulation.inject_founders(founders)?;
        }

        // --- Encounters for the upcoming tick ---
        let live = simulation.live_ids();
        let upcoming = simulation.tick_number().saturating_add(1);
        for (a, b) in encounters.collect_encounters(upcoming, &live) {
            if let Err(err) = simulation.report_encounter(a, b) {
                warn!(first = %a, second = %b, error = %err, "Encounter report rejected");
            }
        }

        // --- Execute tick ---
        let summary = simulation.tick()?;

        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, simulation);

        // --- Check extinction ---
        if summary.agents_alive == 0 && operator.extinction_is_terminal() {
            info!(tick = summary.tick, "All agents dead -- extinction");
            let reason = SimulationEndReason::Extinction;
            operator.set_end_reason(reason).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = SimulationEndReason::MaxTicksReached;
            operator.set_end_reason(reason).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log the simulation end sequence.
///
/// Call after [`run_simulation`] returns.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_agents_alive = result.final_summary.as_ref().map(|s| s.agents_alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            agents_alive = summary.agents_alive,
            total_food = %summary.environment.total_food,
            pollution_percentage = %summary.environment.pollution_percentage,
            average_lifespan = %summary.environment.average_lifespan,
            renewable = summary.renewable_agents,
            extractive = summary.extractive_agents,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
