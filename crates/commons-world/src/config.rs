//! Tunable rates for the environment's own update laws.
//!
//! Like the agent lifecycle rates, these are configuration rather than
//! state: they can be swapped between ticks without touching the
//! environment's aggregates.

use rust_decimal::Decimal;

/// Rates applied by the environment once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Food production per live agent (default: 1). Must be positive.
    pub per_capita_production_rate: Decimal,

    /// Lifespan lost per percentage point of pollution per tick
    /// (default: 0.001).
    pub lifespan_pollution_decay: Decimal,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            per_capita_production_rate: Decimal::ONE,
            lifespan_pollution_decay: Decimal::new(1, 3),
        }
    }
}

impl EnvironmentConfig {
    /// Return the first problem with these rates, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.per_capita_production_rate <= Decimal::ZERO {
            return Err(format!(
                "per_capita_production_rate must be positive, got {}",
                self.per_capita_production_rate
            ));
        }
        if self.lifespan_pollution_decay < Decimal::ZERO {
            return Err(format!(
                "lifespan_pollution_decay must not be negative, got {}",
                self.lifespan_pollution_decay
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.lifespan_pollution_decay, dec!(0.001));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_production_rate_rejected() {
        let config = EnvironmentConfig {
            per_capita_production_rate: Decimal::ZERO,
            ..EnvironmentConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
