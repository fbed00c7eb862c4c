//! Simulation clock, population, tick cycle, and orchestration for the
//! Commons simulation.
//!
//! This crate owns the 4-phase tick cycle that drives the simulation:
//! Agent Step, Encounters, Apply Lifecycle, and Environment.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and phase ordering.
//! - [`config`] -- Configuration loading from `commons-config.yaml` into
//!   strongly-typed structs.
//! - [`encounter`] -- Encounter pairs, the per-tick queue, and the
//!   [`EncounterSource`] trait.
//! - [`operator`] -- Shared pause/stop/speed/configuration controls.
//! - [`population`] -- Live agents and staged births/deaths.
//! - [`runner`] -- The async loop around the tick cycle.
//! - [`simulation`] -- The [`Simulation`] facade and its external operations.
//! - [`tick`] -- The 4-phase tick cycle itself.
//!
//! [`EncounterSource`]: encounter::EncounterSource
//! [`Simulation`]: simulation::Simulation

pub mod clock;
pub mod config;
pub mod encounter;
pub mod operator;
pub mod population;
pub mod runner;
pub mod simulation;
pub mod tick;

pub use config::{ConfigError, SimulationConfig, Tunables};
pub use encounter::{EncounterSource, NoEncounters, ScriptedEncounters};
pub use operator::{OperatorState, SimulationEndReason, SimulationStatus};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use simulation::{Simulation, SimulationError};
pub use tick::{SimulationState, TickError, TickSummary};
