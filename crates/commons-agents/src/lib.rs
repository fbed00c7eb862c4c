//! Agent lifecycle rules for the Commons simulation.
//!
//! This crate contains the logic layer for agents: everything that operates
//! on a single agent's state and its reads and writes against the shared
//! [`Environment`](commons_world::Environment). It owns no collection of
//! agents; the population in `commons-core` does.
//!
//! # Modules
//!
//! - [`config`] -- Tunable rates ([`LifecycleConfig`]) and founder defaults ([`FounderConfig`])
//! - [`death`] -- Death conditions and death records
//! - [`error`] -- Error types for all agent operations ([`AgentError`])
//! - [`lifecycle`] -- Per-tick sub-operations and the composed [`step_agent`]
//! - [`random`] -- Seedable uniform randomness ([`RandomSource`])
//! - [`reproduction`] -- Child and founder construction, placement hints

pub mod config;
pub mod death;
pub mod error;
pub mod lifecycle;
pub mod random;
pub mod reproduction;

// Re-export primary types at crate root for convenience.
pub use config::{FounderConfig, LifecycleConfig};
pub use death::{check_death, death_record};
pub use error::AgentError;
pub use lifecycle::{
    GatherOutcome, StepOutcome, advance_age, breed, check_calamity, check_invariants, check_spawn,
    decide_energy_source, eat_food, gather_food, resolve_encounter, step_agent,
};
pub use random::RandomSource;
pub use reproduction::{agent_name, mutate_traits, placement_request, spawn_child, spawn_founder};
