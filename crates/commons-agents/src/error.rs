//! Error types for the commons-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.

use commons_types::AgentId;
use commons_world::WorldError;
use rust_decimal::Decimal;

/// Errors that can occur while applying lifecycle rules to an agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An arithmetic overflow occurred during a lifecycle computation.
    #[error("arithmetic overflow in lifecycle computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A random draw was requested over an empty or inverted range.
    #[error("invalid random range [{low}, {high}]")]
    InvalidRange {
        /// Requested lower bound.
        low: Decimal,
        /// Requested upper bound.
        high: Decimal,
    },

    /// An agent quantity left its allowed range.
    #[error("agent {agent_id} invariant violated: {field} is {value}")]
    InvariantViolation {
        /// The offending agent.
        agent_id: AgentId,
        /// Name of the offending field.
        field: &'static str,
        /// The observed value.
        value: Decimal,
    },

    /// The shared environment rejected an operation.
    #[error("environment error: {source}")]
    World {
        /// The underlying environment error.
        #[from]
        source: WorldError,
    },
}

/// Build an [`AgentError::ArithmeticOverflow`] for the given context.
pub(crate) fn overflow(context: &str) -> AgentError {
    AgentError::ArithmeticOverflow {
        context: String::from(context),
    }
}
