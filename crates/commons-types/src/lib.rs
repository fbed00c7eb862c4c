//! Shared type definitions for the Commons simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the simulation core and its external collaborators (renderer, spatial
//! system, tuning UI). Types are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Agent sequence ids and run ids
//! - [`enums`] -- Energy source and death cause
//! - [`traits`] -- Clamped trait scores and the four-trait set
//! - [`structs`] -- Agent record, lineage, snapshots, placement and death records

pub mod enums;
pub mod ids;
pub mod structs;
pub mod traits;

// Re-export all public types at crate root for convenience.
pub use enums::{DeathCause, EnergySource};
pub use ids::{AgentId, RunId};
pub use structs::{
    AgentSnapshot, AgentState, DeathRecord, EnvironmentSnapshot, Lineage, PlacementAnchor,
    PlacementRequest,
};
pub use traits::{TRAIT_MAX, TRAIT_MIN, TraitScore, Traits};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::RunId::export_all();

        // Enums
        let _ = crate::enums::EnergySource::export_all();
        let _ = crate::enums::DeathCause::export_all();

        // Traits
        let _ = crate::traits::TraitScore::export_all();
        let _ = crate::traits::Traits::export_all();

        // Structs
        let _ = crate::structs::Lineage::export_all();
        let _ = crate::structs::AgentState::export_all();
        let _ = crate::structs::AgentSnapshot::export_all();
        let _ = crate::structs::EnvironmentSnapshot::export_all();
        let _ = crate::structs::PlacementAnchor::export_all();
        let _ = crate::structs::PlacementRequest::export_all();
        let _ = crate::structs::DeathRecord::export_all();
    }
}
