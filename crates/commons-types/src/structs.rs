//! Core entity structs for the Commons simulation.
//!
//! Covers the per-agent record ([`AgentState`]), the parent snapshot used for
//! inheritance ([`Lineage`]), the read-only views handed to external
//! collaborators ([`AgentSnapshot`], [`EnvironmentSnapshot`]), and the
//! per-tick records of births and deaths ([`PlacementRequest`],
//! [`DeathRecord`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DeathCause, EnergySource};
use crate::ids::AgentId;
use crate::traits::Traits;

// ---------------------------------------------------------------------------
// Agent record
// ---------------------------------------------------------------------------

/// Value snapshot of a parent, taken once at the moment of birth.
///
/// A child never holds a live reference to its parent. The parent may die in
/// the same tick the child is born; the snapshot stays valid regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Lineage {
    /// Identifier of the parent.
    pub parent_id: AgentId,
    /// The parent's generation number.
    pub parent_generation: u32,
    /// The parent's traits at birth time.
    pub traits: Traits,
    /// The parent's strategy at birth time.
    pub energy_source: EnergySource,
    /// The parent's lifespan at birth time.
    #[ts(as = "String")]
    pub lifespan: Decimal,
    /// The parent's breeding threshold at birth time.
    #[ts(as = "String")]
    pub food_to_breed: Decimal,
}

/// Mutable per-agent state, owned exclusively by the population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentState {
    /// Stable identifier, also the agent's position in traversal order.
    pub agent_id: AgentId,
    /// Diagnostic name of the form `Agent{n}`.
    pub name: String,
    /// Behavioural traits, each clamped to `[0, 100]`.
    pub traits: Traits,
    /// Current resource strategy.
    pub energy_source: EnergySource,
    /// Private food buffer. The agent starves when this reaches zero.
    #[ts(as = "String")]
    pub food: Decimal,
    /// Age in simulation units (advances by the aging rate each tick).
    #[ts(as = "String")]
    pub age: Decimal,
    /// Age at which the agent dies of old age.
    #[ts(as = "String")]
    pub lifespan: Decimal,
    /// Food consumed by one act of breeding.
    #[ts(as = "String")]
    pub food_to_breed: Decimal,
    /// Parent's generation + 1; founders are generation 0.
    pub generation: u32,
    /// Tick at which the agent was inserted into the population.
    pub born_at_tick: u64,
    /// Parent snapshot, absent for founders.
    pub lineage: Option<Lineage>,
}

impl AgentState {
    /// Take a value snapshot of this agent for use as a child's lineage.
    pub const fn lineage_snapshot(&self) -> Lineage {
        Lineage {
            parent_id: self.agent_id,
            parent_generation: self.generation,
            traits: self.traits,
            energy_source: self.energy_source,
            lifespan: self.lifespan,
            food_to_breed: self.food_to_breed,
        }
    }

    /// Build the read-only view exposed to external collaborators.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: self.agent_id,
            name: self.name.clone(),
            traits: self.traits,
            energy_source: self.energy_source,
            food: self.food,
            age: self.age,
            lifespan: self.lifespan,
            food_to_breed: self.food_to_breed,
            generation: self.generation,
        }
    }

    /// Whether the agent is a founder (has no parent).
    pub const fn is_founder(&self) -> bool {
        self.lineage.is_none()
    }
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Read-only copy of an agent, as seen by renderers and UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// The agent's identifier.
    pub agent_id: AgentId,
    /// Diagnostic name.
    pub name: String,
    /// Behavioural traits.
    pub traits: Traits,
    /// Current strategy.
    pub energy_source: EnergySource,
    /// Private food buffer.
    #[ts(as = "String")]
    pub food: Decimal,
    /// Current age.
    #[ts(as = "String")]
    pub age: Decimal,
    /// Current lifespan.
    #[ts(as = "String")]
    pub lifespan: Decimal,
    /// Breeding threshold.
    #[ts(as = "String")]
    pub food_to_breed: Decimal,
    /// Generation number.
    pub generation: u32,
}

/// Read-only copy of the shared environment aggregates after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentSnapshot {
    /// Shared food pool.
    #[ts(as = "String")]
    pub total_food: Decimal,
    /// Production capacity (population x per-capita rate).
    #[ts(as = "String")]
    pub food_production: Decimal,
    /// Raw pollution level.
    #[ts(as = "String")]
    pub pollution: Decimal,
    /// Pollution relative to production, in `[0, 100]`.
    #[ts(as = "String")]
    pub pollution_percentage: Decimal,
    /// Mean lifespan of the live population (0 when empty).
    #[ts(as = "String")]
    pub average_lifespan: Decimal,
    /// Number of live agents.
    pub agent_count: u64,
}

// ---------------------------------------------------------------------------
// Per-tick records
// ---------------------------------------------------------------------------

/// What a newborn's position should be offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", content = "parent_id", rename_all = "snake_case")]
pub enum PlacementAnchor {
    /// Place near the parent's current position.
    Parent(AgentId),
    /// Place relative to the world origin (founders).
    World,
}

/// Placement hint handed to the external spatial collaborator for a newborn.
///
/// The core never tracks positions; it only says "put this agent near that
/// anchor, shifted by this much".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlacementRequest {
    /// The newborn agent.
    pub agent_id: AgentId,
    /// What the offset is relative to.
    pub anchor: PlacementAnchor,
    /// Horizontal jitter.
    #[ts(as = "String")]
    pub offset_x: Decimal,
    /// Vertical jitter.
    #[ts(as = "String")]
    pub offset_y: Decimal,
}

/// Record of an agent removed from the population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeathRecord {
    /// The dead agent.
    pub agent_id: AgentId,
    /// Why it died.
    pub cause: DeathCause,
    /// Age at death.
    #[ts(as = "String")]
    pub age: Decimal,
    /// Generation of the dead agent.
    pub generation: u32,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_agent() -> AgentState {
        AgentState {
            agent_id: AgentId::new(4),
            name: String::from("Agent4"),
            traits: Traits::from_values(dec!(10), dec!(20), dec!(30), dec!(40)),
            energy_source: EnergySource::Extractive,
            food: dec!(50),
            age: dec!(2.5),
            lifespan: dec!(97),
            food_to_breed: dec!(50),
            generation: 3,
            born_at_tick: 12,
            lineage: None,
        }
    }

    #[test]
    fn lineage_snapshot_copies_parent_values() {
        let parent = sample_agent();
        let lineage = parent.lineage_snapshot();
        assert_eq!(lineage.parent_id, AgentId::new(4));
        assert_eq!(lineage.parent_generation, 3);
        assert_eq!(lineage.traits, parent.traits);
        assert_eq!(lineage.lifespan, dec!(97));
        assert_eq!(lineage.food_to_breed, dec!(50));
    }

    #[test]
    fn snapshot_matches_state() {
        let agent = sample_agent();
        let snap = agent.snapshot();
        assert_eq!(snap.agent_id, agent.agent_id);
        assert_eq!(snap.food, agent.food);
        assert_eq!(snap.generation, 3);
        assert!(agent.is_founder());
    }

    #[test]
    fn placement_anchor_serializes_tagged() {
        let anchor = PlacementAnchor::Parent(AgentId::new(7));
        let json = serde_json::to_string(&anchor).ok();
        assert_eq!(json.as_deref(), Some(r#"{"kind":"parent","parent_id":7}"#));
        let world = serde_json::to_string(&PlacementAnchor::World).ok();
        assert_eq!(world.as_deref(), Some(r#"{"kind":"world"}"#));
    }
}
