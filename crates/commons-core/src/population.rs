//! The live population and its birth/death staging area.
//!
//! Agents are stored in a [`BTreeMap`] keyed by [`AgentId`], so iteration is
//! always in birth order. During a tick nothing is inserted or removed
//! directly: deaths are staged with [`Population::stage_death`], children
//! with [`Population::stage_birth`], and both are applied together by
//! [`Population::apply_staged`] once the agent snapshot has been fully
//! traversed.

use std::collections::BTreeMap;

use commons_agents::death_record;
use commons_types::{AgentId, AgentState, DeathCause, DeathRecord};

/// Errors raised by population bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The agent id counter is exhausted.
    #[error("agent id counter overflow")]
    CounterOverflow,

    /// An agent with this id is already present or staged.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// No live agent has this id.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
}

/// What [`Population::apply_staged`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedLifecycle {
    /// Ids of children inserted, in birth order.
    pub births: Vec<AgentId>,
    /// Records of agents removed, in id order.
    pub deaths: Vec<DeathRecord>,
}

/// Container of live agents.
#[derive(Debug, Clone, Default)]
pub struct Population {
    /// Live agents, ordered by id (= birth order).
    agents: BTreeMap<AgentId, AgentState>,
    /// Next id to hand out. Monotonic; ids are never reused.
    next_id: u64,
    /// Children queued this tick.
    pending_births: Vec<AgentState>,
    /// Agents queued for removal this tick, with their cause.
    pending_deaths: BTreeMap<AgentId, DeathCause>,
}

impl Population {
    /// Create an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a population from existing agents (scenario setup and tests).
    ///
    /// The id counter resumes after the highest id present.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::DuplicateAgent`] if two agents share an
    /// id, or [`PopulationError::CounterOverflow`] if the highest id is
    /// `u64::MAX`.
    pub fn from_agents(agents: Vec<AgentState>) -> Result<Self, PopulationError> {
        let mut population = Self::new();
        for agent in agents {
            let next = agent
                .agent_id
                .into_inner()
                .checked_add(1)
                .ok_or(PopulationError::CounterOverflow)?;
            population.next_id = population.next_id.max(next);
            population.insert(agent)?;
        }
        Ok(population)
    }

    /// Reserve the next agent id.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::CounterOverflow`] when ids are exhausted.
    pub fn allocate_id(&mut self) -> Result<AgentId, PopulationError> {
        let id = AgentId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(PopulationError::CounterOverflow)?;
        Ok(id)
    }

    /// Insert an agent immediately. Only valid between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::DuplicateAgent`] if the id is taken.
    pub fn insert(&mut self, agent: AgentState) -> Result<(), PopulationError> {
        if self.agents.contains_key(&agent.agent_id) {
            return Err(PopulationError::DuplicateAgent(agent.agent_id));
        }
        self.agents.insert(agent.agent_id, agent);
        Ok(())
    }

    /// Number of live agents.
    pub fn len(&self) -> u64 {
        u64::try_from(self.agents.len()).unwrap_or(u64::MAX)
    }

    /// Whether no agent is alive.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Total agents ever assigned an id.
    pub const fn total_created(&self) -> u64 {
        self.next_id
    }

    /// Whether `agent_id` is alive.
    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.agents.contains_key(&agent_id)
    }

    /// Read a live agent.
    pub fn get(&self, agent_id: AgentId) -> Option<&AgentState> {
        self.agents.get(&agent_id)
    }

    /// Mutably borrow a live agent.
    pub fn get_mut(&mut self, agent_id: AgentId) -> Option<&mut AgentState> {
        self.agents.get_mut(&agent_id)
    }

    /// Snapshot of live ids in ascending order.
    pub fn live_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Iterate live agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.values()
    }

    /// Iterate live agents mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AgentState> {
        self.agents.values_mut()
    }

    /// Live agents' lifespans in id order.
    pub fn lifespans(&self) -> impl Iterator<Item = rust_decimal::Decimal> + '_ {
        self.agents.values().map(|agent| agent.lifespan)
    }

    // -----------------------------------------------------------------------
    // Staging
    // -----------------------------------------------------------------------

    /// Queue an agent for removal at the end of the agent phase.
    ///
    /// Staging the same agent twice keeps the first cause.
    pub fn stage_death(&mut self, agent_id: AgentId, cause: DeathCause) {
        self.pending_deaths.entry(agent_id).or_insert(cause);
    }

    /// Whether `agent_id` is queued to die this tick.
    pub fn is_dying(&self, agent_id: AgentId) -> bool {
        self.pending_deaths.contains_key(&agent_id)
    }

    /// Queue a child for insertion at the end of the agent phase.
    pub fn stage_birth(&mut self, child: AgentState) {
        self.pending_births.push(child);
    }

    /// Remove staged deaths and insert staged births.
    ///
    /// Deaths apply before births; a child's id is always fresh, so the
    /// two sets never overlap.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::AgentNotFound`] if a staged death names an
    /// agent that is not alive, or [`PopulationError::DuplicateAgent`] if a
    /// staged child collides with a live id.
    pub fn apply_staged(&mut self) -> Result<AppliedLifecycle, PopulationError> {
        let mut applied = AppliedLifecycle::default();

        for (agent_id, cause) in std::mem::take(&mut self.pending_deaths) {
            let removed = self
                .agents
                .remove(&agent_id)
                .ok_or(PopulationError::AgentNotFound(agent_id))?;
            applied.deaths.push(death_record(&removed, cause));
        }

        for child in std::mem::take(&mut self.pending_births) {
            let child_id = child.agent_id;
            self.insert(child)?;
            applied.births.push(child_id);
        }

        Ok(applied)
    }

    /// Drop anything staged without applying it (after a failed tick).
    pub fn clear_staged(&mut self) {
        self.pending_births.clear();
        self.pending_deaths.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use commons_types::{EnergySource, Traits};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn agent(id: u64) -> AgentState {
        AgentState {
            agent_id: AgentId::new(id),
            name: format!("Agent{id}"),
            traits: Traits::default(),
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

    #[test]
    fn ids_are_monotonic() {
        let mut population = Population::new();
        let a = population.allocate_id().unwrap();
        let b = population.allocate_id().unwrap();
        assert!(a < b);
        assert_eq!(population.total_created(), 2);
    }

    #[test]
    fn from_agents_resumes_counter() {
        let mut population = Population::from_agents(vec![agent(3), agent(8)]).unwrap();
        assert_eq!(population.len(), 2);
        assert_eq!(population.allocate_id().unwrap(), AgentId::new(9));
    }

    #[test]
    fn duplicate_insert_rejected() {
        let result = Population::from_agents(vec![agent(1), agent(1)]);
        assert!(matches!(result, Err(PopulationError::DuplicateAgent(_))));
    }

    #[test]
    fn staged_changes_apply_together() {
        let mut population = Population::from_agents(vec![agent(0), agent(1)]).unwrap();
        let child_id = population.allocate_id().unwrap();
        population.stage_death(AgentId::new(0), DeathCause::OldAge);
        population.stage_birth(agent(child_id.into_inner()));

        // Nothing changes until applied.
        assert!(population.contains(AgentId::new(0)));
        assert!(!population.contains(child_id));
        assert!(population.is_dying(AgentId::new(0)));

        let applied = population.apply_staged().unwrap();
        assert_eq!(applied.births, vec![child_id]);
        assert_eq!(applied.deaths.len(), 1);
        assert!(!population.contains(AgentId::new(0)));
        assert!(population.contains(child_id));
        assert!(!population.is_dying(AgentId::new(0)));
    }

    #[test]
    fn double_stage_keeps_first_cause() {
        let mut population = Population::from_agents(vec![agent(0)]).unwrap();
        population.stage_death(AgentId::new(0), DeathCause::Starvation);
        population.stage_death(AgentId::new(0), DeathCause::OldAge);
        let applied = population.apply_staged().unwrap();
        assert_eq!(applied.deaths.len(), 1);
        assert_eq!(
            applied.deaths.first().map(|d| d.cause),
            Some(DeathCause::Starvation)
        );
    }

    #[test]
    fn live_ids_are_ascending() {
        let population = Population::from_agents(vec![agent(5), agent(2), agent(9)]).unwrap();
        assert_eq!(
            population.live_ids(),
            vec![AgentId::new(2), AgentId::new(5), AgentId::new(9)]
        );
    }
}
