//! Conservation check for food moved during the gather phase.
//!
//! Every gather moves food from the shared pool into one agent's buffer. The
//! ledger records both sides of each move and, at the end of the agent
//! phase, verifies:
//!
//! ```text
//! sum(credits to agents) == sum(debits from pool) == total gain reported
//! ```
//!
//! The moves balance by construction; a mismatch means a defect in the
//! gather path and is surfaced as [`WorldError::ConservationViolation`].

use rust_decimal::Decimal;

use crate::error::{WorldError, overflow};

/// Running credit/debit totals for one tick's gathers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherLedger {
    credited: Decimal,
    debited: Decimal,
    entries: u64,
}

impl GatherLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record food removed from the pool.
    pub fn record_debit(&mut self, amount: Decimal) -> Result<(), WorldError> {
        self.debited = self
            .debited
            .checked_add(amount)
            .ok_or_else(|| overflow("ledger debit total"))?;
        Ok(())
    }

    /// Record food added to an agent.
    pub fn record_credit(&mut self, amount: Decimal) -> Result<(), WorldError> {
        self.credited = self
            .credited
            .checked_add(amount)
            .ok_or_else(|| overflow("ledger credit total"))?;
        self.entries = self.entries.saturating_add(1);
        Ok(())
    }

    /// Total food credited to agents.
    pub const fn credited(&self) -> Decimal {
        self.credited
    }

    /// Total food debited from the pool.
    pub const fn debited(&self) -> Decimal {
        self.debited
    }

    /// Number of gathers that credited an agent.
    pub const fn entries(&self) -> u64 {
        self.entries
    }

    /// Verify that both sides balance and match the reported gain.
    pub fn verify(&self, gained: Decimal) -> Result<(), WorldError> {
        if self.credited == self.debited && self.debited == gained {
            Ok(())
        } else {
            Err(WorldError::ConservationViolation {
                credited: self.credited,
                debited: self.debited,
                gained,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn balanced_ledger_verifies() {
        let mut ledger = GatherLedger::new();
        ledger.record_debit(dec!(0.012)).unwrap();
        ledger.record_credit(dec!(0.012)).unwrap();
        ledger.record_debit(dec!(0.02)).unwrap();
        ledger.record_credit(dec!(0.02)).unwrap();
        assert!(ledger.verify(dec!(0.032)).is_ok());
        assert_eq!(ledger.entries(), 2);
    }

    #[test]
    fn empty_ledger_verifies_zero_gain() {
        assert!(GatherLedger::new().verify(Decimal::ZERO).is_ok());
    }

    #[test]
    fn unmatched_credit_is_a_violation() {
        let mut ledger = GatherLedger::new();
        ledger.record_debit(dec!(0.01)).unwrap();
        ledger.record_credit(dec!(0.02)).unwrap();
        let err = ledger.verify(dec!(0.02)).unwrap_err();
        assert!(matches!(err, WorldError::ConservationViolation { .. }));
    }

    #[test]
    fn wrong_reported_gain_is_a_violation() {
        let mut ledger = GatherLedger::new();
        ledger.record_debit(dec!(0.01)).unwrap();
        ledger.record_credit(dec!(0.01)).unwrap();
        assert!(ledger.verify(dec!(0.5)).is_err());
    }
}
