//! Tick cycle: the 4-phase loop that drives the Commons simulation.
//!
//! Each tick runs through these phases, in this order, with no suspension
//! point inside:
//!
//! 1. **Agent step** -- take a snapshot of live ids (ascending, i.e. birth
//!    order) and run each agent's lifecycle step against the shared
//!    environment. Dying agents stop acting immediately and are staged for
//!    removal; children are staged for insertion with a placement request.
//!    Agents born this tick do not act. The gather ledger is verified at the
//!    end of the phase.
//!
//! 2. **Encounters** -- resolve every pair reported since the last tick,
//!    in both directions. Pairs involving an agent that is dying this tick
//!    are dropped.
//!
//! 3. **Apply lifecycle** -- remove staged deaths, insert staged births.
//!
//! 4. **Environment** -- recompute production, pollution percentage, apply
//!    pollution decay to lifespans, recompute the average lifespan, grow the
//!    food pool. Then every invariant is checked.
//!
//! Staged tunables are swapped in before phase 1. Given the same seed,
//! configuration, and encounter reports, the cycle is deterministic.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use commons_agents::{
    AgentError, FounderConfig, GatherOutcome, LifecycleConfig, RandomSource, StepOutcome,
    check_invariants, placement_request, resolve_encounter, spawn_child, step_agent,
};
use commons_types::{
    AgentId, DeathRecord, EnergySource, EnvironmentSnapshot, PlacementAnchor, PlacementRequest,
};
use commons_world::{Environment, EnvironmentConfig, GatherLedger, WorldError};

use crate::clock::{ClockError, SimulationClock, TickPhase};
use crate::config::Tunables;
use crate::encounter::EncounterQueue;
use crate::population::{Population, PopulationError};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A lifecycle rule failed for one agent.
    #[error("agent error for {agent_id}: {source}")]
    Agent {
        /// The agent being processed.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// An environment operation failed.
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

    /// A tick-level accumulation overflowed.
    #[error("arithmetic overflow in tick cycle: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A state invariant was broken. The run cannot continue.
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// Description of the broken invariant.
        reason: String,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Number of living agents at end of tick.
    pub agents_alive: u64,
    /// Environment aggregates at end of tick.
    pub environment: EnvironmentSnapshot,
    /// Children inserted this tick.
    pub births: Vec<AgentId>,
    /// Agents removed this tick.
    pub deaths: Vec<DeathRecord>,
    /// Placement hints for this tick's children.
    pub placements: Vec<PlacementRequest>,
    /// Encounter pairs resolved.
    pub encounters_resolved: u64,
    /// Encounter pairs dropped because one side died this tick.
    pub encounters_dropped: u64,
    /// Encounter directions in which influence landed.
    pub influenced: u64,
    /// Agents whose strategy changed this tick.
    pub strategy_switches: u64,
    /// Total food moved from the pool to agents.
    pub food_gathered: Decimal,
    /// Gathers skipped because the pool was below the viability threshold.
    pub gathers_skipped: u64,
    /// Live agents using the renewable strategy at end of tick.
    pub renewable_agents: u64,
    /// Live agents using the extractive strategy at end of tick.
    pub extractive_agents: u64,
    /// Whether staged tunables took effect at the start of this tick.
    pub tunables_applied: bool,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimulationClock,
    /// Live agents and the birth/death staging area.
    pub population: Population,
    /// Shared environment aggregates.
    pub environment: Environment,
    /// Source of every random draw.
    pub random: RandomSource,
    /// Tunables currently in effect.
    pub tunables: Tunables,
    /// Agent-facing view of `tunables`.
    pub lifecycle: LifecycleConfig,
    /// Environment-facing view of `tunables`.
    pub environment_config: EnvironmentConfig,
    /// Founder defaults and placement jitter.
    pub founders: FounderConfig,
    /// Base lifespan for founders injected into an empty population.
    pub fallback_average_lifespan: Decimal,
    /// Encounters reported for the next tick.
    pub encounters: EncounterQueue,
    /// Tunables waiting for the next tick boundary.
    pub staged_tunables: Option<Tunables>,
}

impl SimulationState {
    /// Assemble a state from its parts.
    pub fn new(
        population: Population,
        environment: Environment,
        tunables: &Tunables,
        founders: FounderConfig,
        fallback_average_lifespan: Decimal,
        seed: u64,
    ) -> Self {
        Self {
            clock: SimulationClock::new(),
            population,
            environment,
            random: RandomSource::seeded(seed),
            lifecycle: tunables.lifecycle(),
            environment_config: tunables.environment(),
            tunables: tunables.clone(),
            founders,
            fallback_average_lifespan,
            encounters: EncounterQueue::new(),
            staged_tunables: None,
        }
    }

    /// Put staged tunables into effect. Returns whether any were staged.
    pub fn apply_staged_tunables(&mut self) -> bool {
        let Some(tunables) = self.staged_tunables.take() else {
            return false;
        };
        self.lifecycle = tunables.lifecycle();
        self.environment_config = tunables.environment();
        self.tunables = tunables;
        true
    }

    /// Recompute production, pollution percentage and average lifespan
    /// from the current population, without decay or growth. Used after
    /// founders are inserted between ticks.
    pub fn refresh_aggregates(&mut self) -> Result<(), WorldError> {
        self.environment.recompute_production(
            self.population.len(),
            self.environment_config.per_capita_production_rate,
        )?;
        self.environment.recompute_pollution_percentage()?;
        self.environment
            .recompute_average_lifespan(self.population.lifespans())?;
        Ok(())
    }
}

/// Totals gathered during the agent phase.
#[derive(Debug, Default)]
struct AgentPhaseResult {
    placements: Vec<PlacementRequest>,
    food_gathered: Decimal,
    gathers_skipped: u64,
    strategy_switches: u64,
}

/// Totals gathered during the encounter phase.
#[derive(Debug, Default)]
struct EncounterPhaseResult {
    resolved: u64,
    dropped: u64,
    influenced: u64,
}

/// Execute one complete tick of the simulation.
///
/// On error the clock is returned to idle and anything staged is
/// discarded; the caller is expected to abort the run.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let result = execute_tick(state);
    if result.is_err() {
        state.clock.abort_tick();
        state.population.clear_staged();
    }
    result
}

fn execute_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tunables_applied = state.apply_staged_tunables();

    let tick = state.clock.begin_tick()?;
    info!(
        tick,
        agents = state.population.len(),
        tunables_applied,
        "Tick started"
    );

    // --- Phase 1: Agent step ---
    let agent_phase = phase_agent_step(state, tick)?;

    // --- Phase 2: Encounters ---
    state.clock.enter(TickPhase::Encounters)?;
    let encounter_phase = phase_encounters(state)?;

    // --- Phase 3: Apply births and deaths ---
    state.clock.enter(TickPhase::ApplyLifecycle)?;
    let applied = state.population.apply_staged()?;
    for death in &applied.deaths {
        info!(
            tick,
            agent_id = %death.agent_id,
            cause = %death.cause,
            age = %death.age,
            generation = death.generation,
            "Agent died"
        );
    }
    for placement in &agent_phase.placements {
        info!(tick, agent_id = %placement.agent_id, anchor = ?placement.anchor, "Agent born");
    }

    // --- Phase 4: Environment ---
    state.clock.enter(TickPhase::Environment)?;
    let growth = phase_environment(state)?;
    verify_invariants(state)?;
    state.clock.end_tick()?;

    let (renewable_agents, extractive_agents) = count_strategies(&state.population);
    let agents_alive = state.population.len();
    let environment = state.environment.snapshot(agents_alive);

    info!(
        tick,
        agents_alive,
        births = applied.births.len(),
        deaths = applied.deaths.len(),
        total_food = %environment.total_food,
        pollution = %environment.pollution,
        pollution_percentage = %environment.pollution_percentage,
        average_lifespan = %environment.average_lifespan,
        food_growth = %growth,
        "Tick completed"
    );

    Ok(TickSummary {
        tick,
        agents_alive,
        environment,
        births: applied.births,
        deaths: applied.deaths,
        placements: agent_phase.placements,
        encounters_resolved: encounter_phase.resolved,
        encounters_dropped: encounter_phase.dropped,
        influenced: encounter_phase.influenced,
        strategy_switches: agent_phase.strategy_switches,
        food_gathered: agent_phase.food_gathered,
        gathers_skipped: agent_phase.gathers_skipped,
        renewable_agents,
        extractive_agents,
        tunables_applied,
    })
}

// ---------------------------------------------------------------------------
// Phase 1: Agent step
// ---------------------------------------------------------------------------

fn phase_agent_step(state: &mut SimulationState, tick: u64) -> Result<AgentPhaseResult, TickError> {
    let snapshot = state.population.live_ids();
    let population_size = state.population.len();
    let mut ledger = GatherLedger::new();
    let mut result = AgentPhaseResult::default();

    for agent_id in snapshot {
        let Some(agent) = state.population.get_mut(agent_id) else {
            continue;
        };

        let outcome = step_agent(
            agent,
            &mut state.environment,
            population_size,
            &state.lifecycle,
            &mut state.random,
            &mut ledger,
        )
        .map_err(|source| TickError::Agent { agent_id, source })?;

        match outcome {
            StepOutcome::Died { cause } => {
                debug!(tick, agent_id = %agent_id, cause = %cause, "Agent staged for death");
                state.population.stage_death(agent_id, cause);
            }
            StepOutcome::Survived {
                offspring,
                switched_to,
                gather,
            } => {
                if switched_to.is_some() {
                    result.strategy_switches = result.strategy_switches.saturating_add(1);
                }
                match gather {
                    GatherOutcome::Gathered { gain } => {
                        result.food_gathered = result.food_gathered.checked_add(gain).ok_or_else(
                            || TickError::ArithmeticOverflow {
                                context: String::from("food gathered total"),
                            },
                        )?;
                    }
                    GatherOutcome::Skipped => {
                        result.gathers_skipped = result.gathers_skipped.saturating_add(1);
                    }
                }
                if let Some(lineage) = offspring {
                    let child_id = state.population.allocate_id()?;
                    let child = spawn_child(
                        child_id,
                        tick,
                        &lineage,
                        state.environment.average_lifespan(),
                        &state.lifecycle,
                        &mut state.random,
                    )
                    .map_err(|source| TickError::Agent { agent_id, source })?;
                    let placement = placement_request(
                        child_id,
                        PlacementAnchor::Parent(agent_id),
                        state.founders.child_spawn_jitter,
                        &mut state.random,
                    )
                    .map_err(|source| TickError::Agent { agent_id, source })?;
                    debug!(
                        tick,
                        parent = %agent_id,
                        child = %child_id,
                        generation = child.generation,
                        "Child staged"
                    );
                    state.population.stage_birth(child);
                    result.placements.push(placement);
                }
            }
        }
    }

    ledger
        .verify(result.food_gathered)
        .map_err(|err| TickError::InvariantViolation {
            reason: err.to_string(),
        })?;

    Ok(result)
}

// ---------------------------------------------------------------------------
// Phase 2: Encounters
// ---------------------------------------------------------------------------

fn phase_encounters(state: &mut SimulationState) -> Result<EncounterPhaseResult, TickError> {
    let mut result = EncounterPhaseResult::default();

    for pair in state.encounters.drain() {
        let (a, b) = (pair.first(), pair.second());
        let charismas = state
            .population
            .get(a)
            .zip(state.population.get(b))
            .map(|(agent_a, agent_b)| (agent_a.traits.charisma, agent_b.traits.charisma));

        let Some((charisma_a, charisma_b)) = charismas else {
            debug!(first = %a, second = %b, "Encounter dropped, agent no longer alive");
            result.dropped = result.dropped.saturating_add(1);
            continue;
        };
        if state.population.is_dying(a) || state.population.is_dying(b) {
            debug!(first = %a, second = %b, "Encounter dropped, agent died this tick");
            result.dropped = result.dropped.saturating_add(1);
            continue;
        }

        for (target, influencer_charisma) in [(b, charisma_a), (a, charisma_b)] {
            let Some(agent) = state.population.get_mut(target) else {
                continue;
            };
            let influenced = resolve_encounter(agent, influencer_charisma, &state.lifecycle)
                .map_err(|source| TickError::Agent {
                    agent_id: target,
                    source,
                })?;
            if influenced {
                debug!(agent_id = %target, altruism = %agent.traits.altruism, "Agent influenced");
                result.influenced = result.influenced.saturating_add(1);
            }
        }
        result.resolved = result.resolved.saturating_add(1);
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// Phase 4: Environment
// ---------------------------------------------------------------------------

fn phase_environment(state: &mut SimulationState) -> Result<Decimal, TickError> {
    let env = &mut state.environment;
    env.recompute_production(
        state.population.len(),
        state.environment_config.per_capita_production_rate,
    )?;
    env.recompute_pollution_percentage()?;
    env.apply_pollution_decay_to_lifespans(
        state.population.iter_mut(),
        state.environment_config.lifespan_pollution_decay,
    )?;
    env.recompute_average_lifespan(state.population.lifespans())?;
    let growth = env.grow_total_food()?;
    Ok(growth)
}

fn verify_invariants(state: &SimulationState) -> Result<(), TickError> {
    state
        .environment
        .check_invariants()
        .map_err(|err| TickError::InvariantViolation {
            reason: err.to_string(),
        })?;
    for agent in state.population.iter() {
        check_invariants(agent).map_err(|err| TickError::InvariantViolation {
            reason: err.to_string(),
        })?;
    }
    Ok(())
}

fn count_strategies(population: &Population) -> (u64, u64) {
    population
        .iter()
        .fold((0_u64, 0_u64), |(renewable, extractive), agent| {
            match agent.energy_source {
                EnergySource::Renewable => (renewable.saturating_add(1), extractive),
                EnergySource::Extractive => (renewable, extractive.saturating_add(1)),
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use commons_types::{AgentState, DeathCause, Traits};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::encounter::EncounterPair;

    fn agent(id: u64) -> AgentState {
        AgentState {
            agent_id: AgentId::new(id),
            name: format!("Agent{id}"),
            traits: Traits::from_values(dec!(10), dec!(10), dec!(10), dec!(10)),
            energy_source: EnergySource::Extractive,
            food: dec!(50),
            age: Decimal::ZERO,
            lifespan: dec!(100),
            food_to_breed: dec!(50),
            generation: 0,
            born_at_tick: 0,
            lineage: None,
        }
    }

    fn state_with(agents: Vec<AgentState>) -> SimulationState {
        let population = Population::from_agents(agents).unwrap();
        let environment =
            Environment::with_state(dec!(1000000), Decimal::ZERO, dec!(3), dec!(100)).unwrap();
        SimulationState::new(
            population,
            environment,
            &Tunables::default(),
            FounderConfig::default(),
            dec!(100),
            42,
        )
    }

    #[test]
    fn tick_advances_clock_and_ages_agents() {
        let mut state = state_with(vec![agent(0), agent(1), agent(2)]);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.agents_alive, 3);
        assert!(state.clock.is_idle());
        for a in state.population.iter() {
            assert_eq!(a.age, dec!(0.1));
        }
    }

    #[test]
    fn old_agent_dies_and_is_removed() {
        let mut old = agent(1);
        old.age = dec!(100);
        let mut state = state_with(vec![agent(0), old]);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.deaths.len(), 1);
        assert_eq!(
            summary.deaths.first().map(|d| d.cause),
            Some(DeathCause::OldAge)
        );
        assert!(!state.population.contains(AgentId::new(1)));
        assert_eq!(summary.agents_alive, 1);
    }

    #[test]
    fn production_follows_population() {
        let mut state = state_with(vec![agent(0), agent(1)]);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.environment.food_production, dec!(2));
        assert_eq!(summary.environment.agent_count, 2);
    }

    #[test]
    fn conservation_holds_for_gathers() {
        let mut state = state_with(vec![agent(0), agent(1), agent(2)]);
        let before = state.environment.total_food();
        let summary = run_tick(&mut state).unwrap();
        // Pool change = growth - gathered; growth is production - pollution.
        let growth = summary
            .environment
            .food_production
            .checked_sub(summary.environment.pollution)
            .unwrap()
            .max(Decimal::ZERO);
        let expected = before
            .checked_sub(summary.food_gathered)
            .and_then(|v| v.checked_add(growth))
            .unwrap();
        assert!(summary.food_gathered > Decimal::ZERO);
        assert_eq!(summary.environment.total_food, expected);
    }

    #[test]
    fn encounter_with_dying_agent_is_dropped() {
        let mut dying = agent(1);
        dying.food = dec!(0.001);
        let mut state = state_with(vec![agent(0), dying]);
        state
            .encounters
            .push(EncounterPair::new(AgentId::new(0), AgentId::new(1)).unwrap());
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.encounters_dropped, 1);
        assert_eq!(summary.encounters_resolved, 0);
        let survivor = state.population.get(AgentId::new(0)).unwrap();
        assert_eq!(survivor.traits.altruism.value(), dec!(10));
    }

    #[test]
    fn staged_tunables_apply_at_tick_start() {
        let mut state = state_with(vec![agent(0)]);
        let mut tunables = Tunables::default();
        tunables.aging_rate = dec!(1);
        state.staged_tunables = Some(tunables);
        let summary = run_tick(&mut state).unwrap();
        assert!(summary.tunables_applied);
        assert_eq!(state.population.get(AgentId::new(0)).unwrap().age, dec!(1));
        assert!(state.staged_tunables.is_none());
    }

    #[test]
    fn empty_population_ticks_with_sentinels() {
        let mut state = state_with(Vec::new());
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.agents_alive, 0);
        assert_eq!(summary.environment.average_lifespan, Decimal::ZERO);
        assert_eq!(summary.environment.pollution_percentage, Decimal::ZERO);
    }
}
