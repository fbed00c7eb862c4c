//! Enumeration types for the Commons simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The resource strategy an agent uses when gathering food.
///
/// The two strategies are mutually exclusive and the decision table that
/// picks between them is exhaustive over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    /// Low yield. Heals the environment by removing pollution.
    Renewable,
    /// High yield. Degrades the environment by adding pollution.
    Extractive,
}

impl core::fmt::Display for EnergySource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Renewable => write!(f, "renewable"),
            Self::Extractive => write!(f, "extractive"),
        }
    }
}

/// The cause of an agent's death.
///
/// Both causes have identical consequences; the cause is kept for
/// observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// The agent's private food buffer was exhausted.
    Starvation,
    /// The agent's age reached its lifespan.
    OldAge,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::OldAge => write!(f, "old_age"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_source_serializes_snake_case() {
        let json = serde_json::to_string(&EnergySource::Extractive).ok();
        assert_eq!(json.as_deref(), Some("\"extractive\""));
    }

    #[test]
    fn death_cause_display() {
        assert_eq!(DeathCause::Starvation.to_string(), "starvation");
        assert_eq!(DeathCause::OldAge.to_string(), "old_age");
    }
}
