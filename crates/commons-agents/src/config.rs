//! Tunable rates and thresholds for agent lifecycle rules.
//!
//! [`LifecycleConfig`] bundles every live-tunable rate the per-agent rules
//! read. [`FounderConfig`] holds the fixed starting values for founders and
//! the placement jitter handed to the spatial collaborator. The core builds
//! both from `commons-config.yaml` and can swap [`LifecycleConfig`] between
//! ticks.

use rust_decimal::Decimal;

use crate::error::{AgentError, overflow};

/// Rates and thresholds read by the per-agent rules each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Food eaten per tick before the random discount (default: 0.01).
    pub consumption_baseline: Decimal,

    /// Upper bound of the random discount on consumption (default: 0.005).
    pub consumption_max_discount: Decimal,

    /// Base food gained per gather for either strategy (default: 0.01).
    pub solar_yield: Decimal,

    /// Half-width of the random perturbation on the base yield
    /// (default: 0.005).
    pub yield_variance: Decimal,

    /// Extra food gained per gather by extractive agents (default: 0.01).
    pub extractive_bonus: Decimal,

    /// Pollution added per extractive gather (default: 0.01). Renewable
    /// gathers remove half of this.
    pub extractive_penalty: Decimal,

    /// Age added per surviving tick (default: 0.1).
    pub aging_rate: Decimal,

    /// Agents must be strictly older than this to breed (default: 20).
    pub minimum_breeding_age: Decimal,

    /// Food above `food_to_breed` an agent must hold to breed (default: 10).
    pub breeding_surplus_margin: Decimal,

    /// The shared pool must exceed `population x this` for anyone to breed
    /// (default: 10).
    pub breeding_reserve_per_capita: Decimal,

    /// Half-width of the per-trait mutation applied to children
    /// (default: 10).
    pub trait_mutation_range: Decimal,

    /// Width of the random bonus added to the parent's lifespan before
    /// averaging with the population (default: 10).
    pub lifespan_range: Decimal,

    /// Half-width of the mutation on a child's `food_to_breed` (default: 5).
    pub food_to_breed_range: Decimal,

    /// Floor for a child's `food_to_breed` (default: 10).
    pub minimum_breed_threshold: Decimal,

    /// Altruism gained when influenced by a more charismatic agent
    /// (default: 5).
    pub influence_bonus: Decimal,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            consumption_baseline: Decimal::new(1, 2),
            consumption_max_discount: Decimal::new(5, 3),
            solar_yield: Decimal::new(1, 2),
            yield_variance: Decimal::new(5, 3),
            extractive_bonus: Decimal::new(1, 2),
            extractive_penalty: Decimal::new(1, 2),
            aging_rate: Decimal::new(1, 1),
            minimum_breeding_age: Decimal::from(20),
            breeding_surplus_margin: Decimal::TEN,
            breeding_reserve_per_capita: Decimal::TEN,
            trait_mutation_range: Decimal::TEN,
            lifespan_range: Decimal::TEN,
            food_to_breed_range: Decimal::from(5),
            minimum_breed_threshold: Decimal::TEN,
            influence_bonus: Decimal::from(5),
        }
    }
}

impl LifecycleConfig {
    /// Return the first problem with these values, if any.
    pub fn validate(&self) -> Result<(), String> {
        let non_negative = [
            ("consumption_baseline", self.consumption_baseline),
            ("consumption_max_discount", self.consumption_max_discount),
            ("solar_yield", self.solar_yield),
            ("yield_variance", self.yield_variance),
            ("extractive_bonus", self.extractive_bonus),
            ("extractive_penalty", self.extractive_penalty),
            ("aging_rate", self.aging_rate),
            ("minimum_breeding_age", self.minimum_breeding_age),
            ("breeding_surplus_margin", self.breeding_surplus_margin),
            ("breeding_reserve_per_capita", self.breeding_reserve_per_capita),
            ("trait_mutation_range", self.trait_mutation_range),
            ("lifespan_range", self.lifespan_range),
            ("food_to_breed_range", self.food_to_breed_range),
            ("minimum_breed_threshold", self.minimum_breed_threshold),
            ("influence_bonus", self.influence_bonus),
        ];
        for (name, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(format!("{name} must not be negative, got {value}"));
            }
        }
        if self.consumption_max_discount > self.consumption_baseline {
            return Err(format!(
                "consumption_max_discount ({}) exceeds consumption_baseline ({})",
                self.consumption_max_discount, self.consumption_baseline
            ));
        }
        Ok(())
    }

    /// Half the extractive penalty: the pollution a renewable gather (or a
    /// skipped gather) removes.
    pub fn renewable_cleanup(&self) -> Result<Decimal, AgentError> {
        self.extractive_penalty
            .checked_div(Decimal::TWO)
            .ok_or_else(|| overflow("renewable cleanup"))
    }

    /// Largest food a renewable gather can yield.
    pub fn max_renewable_yield(&self) -> Result<Decimal, AgentError> {
        self.solar_yield
            .checked_add(self.yield_variance)
            .ok_or_else(|| overflow("max renewable yield"))
    }

    /// Largest food an extractive gather can yield.
    pub fn max_extractive_yield(&self) -> Result<Decimal, AgentError> {
        self.max_renewable_yield()?
            .checked_add(self.extractive_bonus)
            .ok_or_else(|| overflow("max extractive yield"))
    }

    /// The pool must exceed this for any gather to happen: the sum of both
    /// strategies' maximum yields.
    pub fn viability_threshold(&self) -> Result<Decimal, AgentError> {
        self.max_renewable_yield()?
            .checked_add(self.max_extractive_yield()?)
            .ok_or_else(|| overflow("viability threshold"))
    }
}

/// Fixed starting values for founders and placement jitter for newborns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FounderConfig {
    /// Starting food for founders (default: 50).
    pub founder_food: Decimal,

    /// Starting `food_to_breed` for founders (default: 50).
    pub founder_food_to_breed: Decimal,

    /// Half-width of the random offset on a founder's lifespan around the
    /// population average (default: 10).
    pub founder_lifespan_range: Decimal,

    /// Placement jitter around a parent (default: 10).
    pub child_spawn_jitter: Decimal,

    /// Placement jitter around the world origin for founders (default: 100).
    pub founder_spawn_jitter: Decimal,
}

impl Default for FounderConfig {
    fn default() -> Self {
        Self {
            founder_food: Decimal::from(50),
            founder_food_to_breed: Decimal::from(50),
            founder_lifespan_range: Decimal::TEN,
            child_spawn_jitter: Decimal::TEN,
            founder_spawn_jitter: Decimal::ONE_HUNDRED,
        }
    }
}

impl FounderConfig {
    /// Return the first problem with these values, if any.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("founder_food", self.founder_food),
            ("founder_food_to_breed", self.founder_food_to_breed),
            ("founder_lifespan_range", self.founder_lifespan_range),
            ("child_spawn_jitter", self.child_spawn_jitter),
            ("founder_spawn_jitter", self.founder_spawn_jitter),
        ] {
            if value < Decimal::ZERO {
                return Err(format!("{name} must not be negative, got {value}"));
            }
        }
        Ok(())
    }
}
