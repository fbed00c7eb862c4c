//! The shared environment: food pool, production, pollution, and the
//! population's running average lifespan.
//!
//! There is exactly one [`Environment`] per run. Agents reach it only
//! through the named operations below; nothing outside this module writes
//! its fields. Per tick the environment sees two kinds of writes:
//!
//! 1. During the agent phase, each gather withdraws food from the pool and
//!    adds or removes pollution ([`Environment::withdraw_food`],
//!    [`Environment::add_pollution`], [`Environment::remove_pollution`],
//!    [`Environment::passive_decay`]).
//! 2. After births and deaths are applied, the aggregates are recomputed in
//!    a fixed order: production, pollution percentage, lifespan decay,
//!    average lifespan, food growth.
//!
//! An empty population is not an error: production, pollution percentage
//! and average lifespan all fall to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use commons_types::{AgentState, EnvironmentSnapshot};

use crate::error::{WorldError, overflow};

/// Starting size of the shared food pool.
pub const DEFAULT_INITIAL_TOTAL_FOOD: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Starting average lifespan, used to seed founders before any agent exists.
pub const DEFAULT_INITIAL_AVERAGE_LIFESPAN: Decimal = Decimal::ONE_HUNDRED;

/// Shared world aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    total_food: Decimal,
    food_production: Decimal,
    pollution: Decimal,
    pollution_percentage: Decimal,
    average_lifespan: Decimal,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_TOTAL_FOOD, DEFAULT_INITIAL_AVERAGE_LIFESPAN)
    }
}

impl Environment {
    /// Create an environment with a starting food pool and average lifespan.
    ///
    /// Negative inputs are floored at zero. Production, pollution and the
    /// percentage start at zero until the first recomputation.
    pub fn new(total_food: Decimal, average_lifespan: Decimal) -> Self {
        Self {
            total_food: total_food.max(Decimal::ZERO),
            food_production: Decimal::ZERO,
            pollution: Decimal::ZERO,
            pollution_percentage: Decimal::ZERO,
            average_lifespan: average_lifespan.max(Decimal::ZERO),
        }
    }

    /// Shared food pool.
    pub const fn total_food(&self) -> Decimal {
        self.total_food
    }

    /// Production capacity computed at the last recomputation.
    pub const fn food_production(&self) -> Decimal {
        self.food_production
    }

    /// Raw pollution level.
    pub const fn pollution(&self) -> Decimal {
        self.pollution
    }

    /// Pollution relative to production, in `[0, 100]`.
    pub const fn pollution_percentage(&self) -> Decimal {
        self.pollution_percentage
    }

    /// Mean lifespan of the live population at the last recomputation.
    pub const fn average_lifespan(&self) -> Decimal {
        self.average_lifespan
    }

    // -----------------------------------------------------------------------
    // Agent-phase writes
    // -----------------------------------------------------------------------

    /// Remove up to `requested` food from the pool and return the amount
    /// actually removed.
    ///
    /// The amount is capped at the pool so the pool never goes negative and
    /// the caller can credit exactly what was removed.
    pub fn withdraw_food(&mut self, requested: Decimal) -> Result<Decimal, WorldError> {
        if requested < Decimal::ZERO {
            return Err(WorldError::NegativeAmount {
                operation: "withdraw_food",
                amount: requested,
            });
        }
        let granted = requested.min(self.total_food);
        self.total_food = self
            .total_food
            .checked_sub(granted)
            .ok_or_else(|| overflow("food pool withdrawal"))?;
        Ok(granted)
    }

    /// Raise pollution by `amount` without pushing it above production.
    ///
    /// If pollution already sits at or above production (because the
    /// population shrank), it is left unchanged rather than lowered.
    pub fn add_pollution(&mut self, amount: Decimal) -> Result<(), WorldError> {
        if amount < Decimal::ZERO {
            return Err(WorldError::NegativeAmount {
                operation: "add_pollution",
                amount,
            });
        }
        if self.pollution >= self.food_production {
            return Ok(());
        }
        let raised = self
            .pollution
            .checked_add(amount)
            .ok_or_else(|| overflow("pollution increase"))?;
        if raised > self.food_production {
            tracing::debug!(
                pollution = %raised,
                ceiling = %self.food_production,
                "pollution capped at food production"
            );
        }
        self.pollution = raised.min(self.food_production);
        Ok(())
    }

    /// Lower pollution by `amount`, flooring at zero.
    pub fn remove_pollution(&mut self, amount: Decimal) -> Result<(), WorldError> {
        if amount < Decimal::ZERO {
            return Err(WorldError::NegativeAmount {
                operation: "remove_pollution",
                amount,
            });
        }
        let lowered = self
            .pollution
            .checked_sub(amount)
            .ok_or_else(|| overflow("pollution decrease"))?;
        self.pollution = lowered.max(Decimal::ZERO);
        Ok(())
    }

    /// Passive pollution decay applied when a gather is skipped for lack of
    /// food. Same floor-at-zero rule as [`Self::remove_pollution`].
    pub fn passive_decay(&mut self, amount: Decimal) -> Result<(), WorldError> {
        self.remove_pollution(amount)
    }

    // -----------------------------------------------------------------------
    // Phase 4: aggregate recomputation
    // -----------------------------------------------------------------------

    /// `food_production = population_size x per_capita_rate`.
    pub fn recompute_production(
        &mut self,
        population_size: u64,
        per_capita_rate: Decimal,
    ) -> Result<(), WorldError> {
        self.food_production = Decimal::from(population_size)
            .checked_mul(per_capita_rate)
            .ok_or_else(|| overflow("food production"))?;
        Ok(())
    }

    /// `clamp(pollution / food_production x 100, 0, 100)`, or 0 when
    /// production is 0.
    pub fn recompute_pollution_percentage(&mut self) -> Result<(), WorldError> {
        if self.food_production <= Decimal::ZERO {
            self.pollution_percentage = Decimal::ZERO;
            return Ok(());
        }
        let ratio = self
            .pollution
            .checked_div(self.food_production)
            .ok_or_else(|| overflow("pollution ratio"))?;
        let percentage = ratio
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| overflow("pollution percentage"))?;
        self.pollution_percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        Ok(())
    }

    /// Subtract `pollution_percentage x decay_rate` from every agent's
    /// lifespan, flooring each at zero.
    pub fn apply_pollution_decay_to_lifespans<'a, I>(
        &self,
        agents: I,
        decay_rate: Decimal,
    ) -> Result<(), WorldError>
    where
        I: IntoIterator<Item = &'a mut AgentState>,
    {
        let loss = self
            .pollution_percentage
            .checked_mul(decay_rate)
            .ok_or_else(|| overflow("lifespan pollution loss"))?;
        if loss <= Decimal::ZERO {
            return Ok(());
        }
        for agent in agents {
            let reduced = agent
                .lifespan
                .checked_sub(loss)
                .ok_or_else(|| overflow("lifespan decay"))?;
            agent.lifespan = reduced.max(Decimal::ZERO);
        }
        Ok(())
    }

    /// Arithmetic mean of the given lifespans; 0 for an empty population.
    pub fn recompute_average_lifespan<I>(&mut self, lifespans: I) -> Result<(), WorldError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut sum = Decimal::ZERO;
        let mut count: u64 = 0;
        for lifespan in lifespans {
            sum = sum
                .checked_add(lifespan)
                .ok_or_else(|| overflow("lifespan sum"))?;
            count = count
                .checked_add(1)
                .ok_or_else(|| overflow("lifespan count"))?;
        }
        self.average_lifespan = if count == 0 {
            Decimal::ZERO
        } else {
            sum.checked_div(Decimal::from(count))
                .ok_or_else(|| overflow("average lifespan"))?
        };
        Ok(())
    }

    /// `total_food += max(0, food_production - pollution)`.
    pub fn grow_total_food(&mut self) -> Result<Decimal, WorldError> {
        let growth = self
            .food_production
            .checked_sub(self.pollution)
            .ok_or_else(|| overflow("food growth"))?
            .max(Decimal::ZERO);
        self.total_food = self
            .total_food
            .checked_add(growth)
            .ok_or_else(|| overflow("food pool growth"))?;
        Ok(growth)
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Build the read-only view for a population of `agent_count` agents.
    pub const fn snapshot(&self, agent_count: u64) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            total_food: self.total_food,
            food_production: self.food_production,
            pollution: self.pollution,
            pollution_percentage: self.pollution_percentage,
            average_lifespan: self.average_lifespan,
            agent_count,
        }
    }

    /// Verify every non-negativity and range invariant.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for (field, value) in [
            ("total_food", self.total_food),
            ("food_production", self.food_production),
            ("pollution", self.pollution),
            ("average_lifespan", self.average_lifespan),
        ] {
            if value < Decimal::ZERO {
                return Err(WorldError::NegativeQuantity { field, value });
            }
        }
        if self.pollution_percentage < Decimal::ZERO
            || self.pollution_percentage > Decimal::ONE_HUNDRED
        {
            return Err(WorldError::PercentageOutOfRange {
                value: self.pollution_percentage,
            });
        }
        Ok(())
    }

    /// Overwrite the aggregates directly. Intended for scenario setup in
    /// tests and tools; the tick cycle never calls this.
    pub fn with_state(
        total_food: Decimal,
        pollution: Decimal,
        food_production: Decimal,
        average_lifespan: Decimal,
    ) -> Result<Self, WorldError> {
        let mut env = Self {
            total_food: total_food.max(Decimal::ZERO),
            food_production: food_production.max(Decimal::ZERO),
            pollution: pollution.max(Decimal::ZERO),
            pollution_percentage: Decimal::ZERO,
            average_lifespan: average_lifespan.max(Decimal::ZERO),
        };
        env.recompute_pollution_percentage()?;
        Ok(env)
    }
}
