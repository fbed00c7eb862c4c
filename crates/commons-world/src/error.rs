//! Error types for the `commons-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use rust_decimal::Decimal;

/// Errors that can occur while updating the shared environment.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow in environment computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A quantity that must never be negative was negative.
    #[error("environment invariant violated: {field} is {value}")]
    NegativeQuantity {
        /// Name of the offending field.
        field: &'static str,
        /// The observed value.
        value: Decimal,
    },

    /// The pollution percentage left `[0, 100]`.
    #[error("pollution percentage {value} outside [0, 100]")]
    PercentageOutOfRange {
        /// The observed percentage.
        value: Decimal,
    },

    /// Food credited to agents did not match food debited from the pool.
    #[error(
        "conservation violated: credited {credited}, debited {debited}, reported gain {gained}"
    )]
    ConservationViolation {
        /// Sum of food added to agents.
        credited: Decimal,
        /// Sum of food removed from the pool.
        debited: Decimal,
        /// Total gain the gather phase reported.
        gained: Decimal,
    },

    /// A negative amount was passed to an operation that moves a quantity.
    #[error("negative amount {amount} passed to {operation}")]
    NegativeAmount {
        /// The operation that rejected the amount.
        operation: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },
}

/// Build an [`WorldError::ArithmeticOverflow`] for the given context.
pub(crate) fn overflow(context: &str) -> WorldError {
    WorldError::ArithmeticOverflow {
        context: String::from(context),
    }
}
