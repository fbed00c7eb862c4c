//! Shared environment for the Commons simulation.
//!
//! This crate owns the world-level aggregates every agent reads and writes:
//! the food pool, production capacity, pollution, and the running average
//! lifespan. It knows nothing about individual decisions; agent rules call
//! into it through named operations.
//!
//! # Modules
//!
//! - [`config`] -- Per-tick environment rates ([`EnvironmentConfig`])
//! - [`conservation`] -- Gather credit/debit ledger ([`GatherLedger`])
//! - [`environment`] -- The [`Environment`] aggregate and its update laws
//! - [`error`] -- Error types ([`WorldError`])

pub mod config;
pub mod conservation;
pub mod environment;
pub mod error;

// Re-export primary types at crate root.
pub use config::EnvironmentConfig;
pub use conservation::GatherLedger;
pub use environment::{DEFAULT_INITIAL_AVERAGE_LIFESPAN, DEFAULT_INITIAL_TOTAL_FOOD, Environment};
pub use error::WorldError;
