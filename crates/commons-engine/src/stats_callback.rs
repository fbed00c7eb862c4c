//! Tick callback that logs periodic population statistics.

use commons_core::{Simulation, TickCallback, TickSummary};
use tracing::{debug, info};

/// Logs a statistics line every `interval` ticks, and a debug line for
/// every tick with births or deaths.
#[derive(Debug, Clone)]
pub struct StatsLogger {
    interval: u64,
    births: u64,
    deaths: u64,
}

impl StatsLogger {
    /// Create a logger reporting every `interval` ticks (0 is treated as 1).
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            births: 0,
            deaths: 0,
        }
    }

    /// Births seen so far.
    pub const fn births(&self) -> u64 {
        self.births
    }

    /// Deaths seen so far.
    pub const fn deaths(&self) -> u64 {
        self.deaths
    }
}

impl TickCallback for StatsLogger {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        let births = u64::try_from(summary.births.len()).unwrap_or(u64::MAX);
        let deaths = u64::try_from(summary.deaths.len()).unwrap_or(u64::MAX);
        self.births = self.births.saturating_add(births);
        self.deaths = self.deaths.saturating_add(deaths);

        if births > 0 || deaths > 0 {
            debug!(tick = summary.tick, births, deaths, "Population changed");
        }

        if summary.tick.checked_rem(self.interval) == Some(0) {
            let env = &summary.environment;
            info!(
                tick = summary.tick,
                agents_alive = summary.agents_alive,
                agents_created = simulation.agents_created(),
                total_births = self.births,
                total_deaths = self.deaths,
                renewable = summary.renewable_agents,
                extractive = summary.extractive_agents,
                total_food = %env.total_food,
                pollution = %env.pollution,
                pollution_percentage = %env.pollution_percentage,
                average_lifespan = %env.average_lifespan,
                "Simulation stats"
            );
        }
    }
}
