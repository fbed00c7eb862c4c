//! The simulation facade.
//!
//! [`Simulation`] is the one object an application talks to. It owns the
//! [`SimulationState`] and exposes the external operations: advance a tick,
//! report encounters, read snapshots, stage configuration, and inject
//! founders. Everything that mutates the population outside of
//! [`run_tick`] happens here, and only while the clock is idle.

use rust_decimal::Decimal;
use tracing::{info, warn};

use commons_agents::{AgentError, placement_request, spawn_founder};
use commons_types::{
    AgentId, AgentSnapshot, EnvironmentSnapshot, PlacementAnchor, PlacementRequest, RunId,
};
use commons_world::{Environment, WorldError};

use crate::config::{ConfigError, SimulationConfig, Tunables};
use crate::encounter::EncounterPair;
use crate::population::{Population, PopulationError};
use crate::tick::{SimulationState, TickError, TickSummary, run_tick};

/// Errors surfaced by the simulation facade.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The tick failed and the run must abort.
    #[error("tick failed: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// Proposed configuration was rejected. The previous one stays in effect.
    #[error("configuration rejected: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// An encounter named an agent that is not alive.
    #[error("unknown agent: {agent_id}")]
    UnknownAgent {
        /// The id that was not found.
        agent_id: AgentId,
    },

    /// An encounter named the same agent twice.
    #[error("agent {agent_id} cannot encounter itself")]
    SelfEncounter {
        /// The repeated id.
        agent_id: AgentId,
    },

    /// An earlier tick failed; the state is no longer consistent.
    #[error("simulation halted after a failed tick")]
    Halted,

    /// The operation is only valid between ticks.
    #[error("operation not allowed while a tick is in progress")]
    TickInProgress,

    /// Founder construction failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// An environment recomputation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Population bookkeeping failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },
}

/// A running Commons simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
    run_id: RunId,
    failed: bool,
}

impl Simulation {
    /// Build a simulation from configuration and inject the initial founders.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if the configuration is invalid,
    /// or an agent/world error if founder construction fails.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let environment = Environment::new(
            config.population.initial_total_food,
            config.population.initial_average_lifespan,
        );
        let state = SimulationState::new(
            Population::new(),
            environment,
            &config.tunables,
            config.population.founder_config(),
            config.population.initial_average_lifespan,
            config.world.seed,
        );
        let mut simulation = Self::from_state(state);
        simulation.inject_founders(config.population.initial_agents)?;

        info!(
            run_id = %simulation.run_id,
            world = %config.world.name,
            seed = config.world.seed,
            agents = simulation.population_size(),
            "Simulation created"
        );
        Ok(simulation)
    }

    /// Wrap an already assembled state. Aggregates are taken as given.
    pub fn from_state(state: SimulationState) -> Self {
        Self {
            state,
            run_id: RunId::new(),
            failed: false,
        }
    }

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Tick`] if the tick fails. Agents already
    /// stepped keep their changes, so every later call returns
    /// [`SimulationError::Halted`].
    pub fn tick(&mut self) -> Result<TickSummary, SimulationError> {
        if self.failed {
            return Err(SimulationError::Halted);
        }
        let result = run_tick(&mut self.state);
        if let Err(ref err) = result {
            self.failed = true;
            warn!(
                run_id = %self.run_id,
                tick = self.state.clock.tick(),
                error = %err,
                "Tick failed, simulation halted"
            );
        }
        Ok(result?)
    }

    /// Whether a tick has failed and the simulation refuses further ticks.
    pub const fn is_halted(&self) -> bool {
        self.failed
    }

    /// Report that `a` and `b` met. Resolved during the next tick's
    /// encounter phase; a repeated pair is counted once.
    ///
    /// Returns `false` if the pair was already reported for this tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::SelfEncounter`] for `a == b` and
    /// [`SimulationError::UnknownAgent`] if either agent is not alive.
    pub fn report_encounter(&mut self, a: AgentId, b: AgentId) -> Result<bool, SimulationError> {
        for agent_id in [a, b] {
            if !self.state.population.contains(agent_id) {
                return Err(SimulationError::UnknownAgent { agent_id });
            }
        }
        let pair = EncounterPair::new(a, b).ok_or(SimulationError::SelfEncounter { agent_id: a })?;
        Ok(self.state.encounters.push(pair))
    }

    /// Read-only view of one live agent.
    pub fn agent_snapshot(&self, agent_id: AgentId) -> Option<AgentSnapshot> {
        self.state.population.get(agent_id).map(commons_types::AgentState::snapshot)
    }

    /// Read-only views of every live agent, in id order.
    pub fn agent_snapshots(&self) -> Vec<AgentSnapshot> {
        self.state
            .population
            .iter()
            .map(commons_types::AgentState::snapshot)
            .collect()
    }

    /// Current environment aggregates.
    pub fn environment_snapshot(&self) -> EnvironmentSnapshot {
        self.state
            .environment
            .snapshot(self.state.population.len())
    }

    /// Validate `tunables` and stage them for the start of the next tick.
    /// A later call before that tick replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if validation fails; nothing is
    /// staged and the current tunables stay in effect.
    pub fn set_configuration(&mut self, tunables: &Tunables) -> Result<(), SimulationError> {
        if let Err(err) = tunables.validate() {
            warn!(error = %err, "Configuration rejected");
            return Err(err.into());
        }
        info!("Configuration staged for next tick");
        self.state.staged_tunables = Some(tunables.clone());
        Ok(())
    }

    /// Insert `count` founders immediately. Valid only between ticks,
    /// including after extinction.
    ///
    /// Founder lifespans centre on the current average lifespan, or on the
    /// configured initial average when nobody is alive. Production,
    /// pollution percentage and average lifespan are refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::TickInProgress`] mid-tick, or an
    /// agent/world/population error if construction fails.
    pub fn inject_founders(&mut self, count: u32) -> Result<Vec<PlacementRequest>, SimulationError> {
        if !self.state.clock.is_idle() {
            return Err(SimulationError::TickInProgress);
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let state = &mut self.state;
        let average_lifespan = if state.population.is_empty() {
            state.fallback_average_lifespan
        } else {
            state.environment.average_lifespan()
        };
        let born_at_tick = state.clock.tick();

        let mut placements = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
        for _ in 0..count {
            let agent_id = state.population.allocate_id()?;
            let founder = spawn_founder(
                agent_id,
                born_at_tick,
                average_lifespan,
                &state.founders,
                &mut state.random,
            )?;
            let placement = placement_request(
                agent_id,
                PlacementAnchor::World,
                state.founders.founder_spawn_jitter,
                &mut state.random,
            )?;
            state.population.insert(founder)?;
            placements.push(placement);
        }
        state.refresh_aggregates()?;

        info!(
            count,
            agents = state.population.len(),
            average_lifespan = %state.environment.average_lifespan(),
            "Founders injected"
        );
        Ok(placements)
    }

    /// Number of the last tick that ran.
    pub const fn tick_number(&self) -> u64 {
        self.state.clock.tick()
    }

    /// Number of living agents.
    pub fn population_size(&self) -> u64 {
        self.state.population.len()
    }

    /// Total agents ever created.
    pub const fn agents_created(&self) -> u64 {
        self.state.population.total_created()
    }

    /// Tunables currently in effect.
    pub const fn tunables(&self) -> &Tunables {
        &self.state.tunables
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Live ids in ascending order.
    pub fn live_ids(&self) -> Vec<AgentId> {
        self.state.population.live_ids()
    }

    /// Read access to the full state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Base lifespan used for founders when nobody is alive.
    pub const fn fallback_average_lifespan(&self) -> Decimal {
        self.state.fallback_average_lifespan
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use commons_agents::FounderConfig;
    use commons_types::{AgentState, EnergySource, Traits};
    use rust_decimal_macros::dec;

    use super::*;

    fn small_config(agents: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.population.initial_agents = agents;
        config
    }

    #[test]
    fn new_injects_founders() {
        let sim = Simulation::new(&small_config(10)).unwrap();
        assert_eq!(sim.population_size(), 10);
        assert_eq!(sim.tick_number(), 0);
        let env = sim.environment_snapshot();
        assert_eq!(env.food_production, dec!(10));
        assert_eq!(env.agent_count, 10);
        assert!(env.average_lifespan >= dec!(90));
        assert!(env.average_lifespan <= dec!(110));
    }

    #[test]
    fn founders_are_extractive_generation_zero() {
        let sim = Simulation::new(&small_config(5)).unwrap();
        for snapshot in sim.agent_snapshots() {
            assert_eq!(snapshot.generation, 0);
            assert_eq!(
                snapshot.energy_source,
                commons_types::EnergySource::Extractive
            );
            assert_eq!(snapshot.food, dec!(50));
        }
    }

    #[test]
    fn report_encounter_validates_ids() {
        let mut sim = Simulation::new(&small_config(2)).unwrap();
        let a = AgentId::new(0);
        let b = AgentId::new(1);
        assert!(sim.report_encounter(a, b).unwrap());
        assert!(!sim.report_encounter(b, a).unwrap());
        assert!(matches!(
            sim.report_encounter(a, a),
            Err(SimulationError::SelfEncounter { .. })
        ));
        assert!(matches!(
            sim.report_encounter(a, AgentId::new(99)),
            Err(SimulationError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn invalid_configuration_is_not_staged() {
        let mut sim = Simulation::new(&small_config(2)).unwrap();
        let mut tunables = Tunables::default();
        tunables.per_capita_production = Decimal::ZERO;
        assert!(sim.set_configuration(&tunables).is_err());
        assert!(sim.state().staged_tunables.is_none());
    }

    #[test]
    fn valid_configuration_applies_next_tick() {
        let mut sim = Simulation::new(&small_config(2)).unwrap();
        let mut tunables = Tunables::default();
        tunables.per_capita_production = dec!(2);
        sim.set_configuration(&tunables).unwrap();
        assert_eq!(sim.tunables().per_capita_production, dec!(1));
        let summary = sim.tick().unwrap();
        assert!(summary.tunables_applied);
        assert_eq!(sim.tunables().per_capita_production, dec!(2));
        assert_eq!(summary.environment.food_production, dec!(4));
    }

    #[test]
    fn founders_after_extinction_use_fallback_lifespan() {
        let mut sim = Simulation::new(&small_config(0)).unwrap();
        assert_eq!(sim.population_size(), 0);
        let summary = sim.tick().unwrap();
        assert_eq!(summary.environment.average_lifespan, Decimal::ZERO);

        let placements = sim.inject_founders(3).unwrap();
        assert_eq!(placements.len(), 3);
        assert!(
            placements
                .iter()
                .all(|p| p.anchor == PlacementAnchor::World)
        );
        for snapshot in sim.agent_snapshots() {
            assert!(snapshot.lifespan >= dec!(90));
        }
    }

    #[test]
    fn failed_tick_halts_the_simulation() {
        // The last id below u64::MAX: the first child exhausts the counter.
        let parent = AgentState {
            agent_id: AgentId::new(u64::MAX.saturating_sub(1)),
            name: String::from("Agent18446744073709551614"),
            traits: Traits::from_values(dec!(50), dec!(50), dec!(50), dec!(100)),
            energy_source: EnergySource::Extractive,
            food: dec!(1000),
            age: dec!(25),
            lifespan: dec!(1000),
            food_to_breed: dec!(80),
            generation: 0,
            born_at_tick: 0,
            lineage: None,
        };
        let env = Environment::with_state(dec!(1000000), dec!(5), dec!(1), dec!(1000)).unwrap();
        let state = SimulationState::new(
            Population::from_agents(vec![parent]).unwrap(),
            env,
            &Tunables::default(),
            FounderConfig::default(),
            dec!(100),
            1,
        );
        let mut sim = Simulation::from_state(state);

        let first = sim.tick();
        assert!(matches!(first, Err(SimulationError::Tick { .. })));
        assert!(sim.is_halted());

        let second = sim.tick();
        assert!(matches!(second, Err(SimulationError::Halted)));
        assert!(sim.is_halted());
    }

    #[test]
    fn same_seed_same_population() {
        let mut first = Simulation::new(&small_config(20)).unwrap();
        let mut second = Simulation::new(&small_config(20)).unwrap();
        for _ in 0..10 {
            first.tick().unwrap();
            second.tick().unwrap();
        }
        assert_eq!(first.agent_snapshots(), second.agent_snapshots());
        assert_eq!(first.environment_snapshot(), second.environment_snapshot());
    }
}
