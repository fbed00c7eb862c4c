//! Per-tick lifecycle rules for a single agent.
//!
//! Each live agent runs one step per tick, composed of ordered
//! sub-operations:
//!
//! 1. [`eat_food`] -- consume from the private buffer
//! 2. [`check_death`](crate::death::check_death) -- stop here if dead
//! 3. [`check_spawn`] / [`breed`] -- queue a child if eligible
//! 4. [`check_calamity`] -- pick the strategy for this tick
//! 5. [`gather_food`] -- draw from the shared pool
//! 6. [`advance_age`] -- grow older
//!
//! [`step_agent`] runs the whole sequence. Encounters are resolved
//! separately, after every agent has stepped ([`resolve_encounter`]).
//!
//! All random draws are bounded and every mutated quantity is clamped or
//! floored immediately, so an agent satisfies its invariants between any
//! two sub-operations.

use rust_decimal::Decimal;

use commons_types::{AgentState, DeathCause, EnergySource, Lineage, TraitScore, Traits};
use commons_world::{Environment, GatherLedger};

use crate::config::LifecycleConfig;
use crate::death::check_death;
use crate::error::{AgentError, overflow};
use crate::random::RandomSource;

/// What a gather did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherOutcome {
    /// Food moved from the pool to the agent.
    Gathered {
        /// Food credited to the agent.
        gain: Decimal,
    },
    /// The pool was at or below the viability threshold; nothing moved and
    /// pollution decayed passively.
    Skipped,
}

impl GatherOutcome {
    /// Food credited by this gather (zero when skipped).
    pub const fn gain(self) -> Decimal {
        match self {
            Self::Gathered { gain } => gain,
            Self::Skipped => Decimal::ZERO,
        }
    }
}

/// Result of one agent's per-tick step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The agent died. No further sub-operations ran.
    Died {
        /// Why it died.
        cause: DeathCause,
    },
    /// The agent survived the tick.
    Survived {
        /// Parent snapshot for a child queued this tick.
        offspring: Option<Lineage>,
        /// The new strategy, if the calamity check changed it.
        switched_to: Option<EnergySource>,
        /// What the gather did.
        gather: GatherOutcome,
    },
}

/// Run the full per-tick step for one agent.
///
/// `population_size` is the live count at the start of the tick and is
/// used for the breeding reserve check.
pub fn step_agent(
    agent: &mut AgentState,
    env: &mut Environment,
    population_size: u64,
    config: &LifecycleConfig,
    random: &mut RandomSource,
    ledger: &mut GatherLedger,
) -> Result<StepOutcome, AgentError> {
    eat_food(agent, config, random)?;

    if let Some(cause) = check_death(agent) {
        return Ok(StepOutcome::Died { cause });
    }

    let offspring = if check_spawn(agent, env, population_size, config)? {
        Some(breed(agent)?)
    } else {
        None
    };

    let switched_to = check_calamity(agent, env);
    let gather = gather_food(agent, env, config, random, ledger)?;
    advance_age(agent, config)?;

    Ok(StepOutcome::Survived {
        offspring,
        switched_to,
        gather,
    })
}

/// Subtract this tick's consumption from the agent's buffer.
///
/// Consumption is `baseline - uniform(0, max_discount)`, never negative.
/// The buffer is floored at zero; an agent left at zero starves in the
/// death check that follows. Returns the amount consumed.
pub fn eat_food(
    agent: &mut AgentState,
    config: &LifecycleConfig,
    random: &mut RandomSource,
) -> Result<Decimal, AgentError> {
    let discount = random.uniform(Decimal::ZERO, config.consumption_max_discount)?;
    let consumption = config
        .consumption_baseline
        .checked_sub(discount)
        .ok_or_else(|| overflow("consumption"))?
        .max(Decimal::ZERO);
    let remaining = agent
        .food
        .checked_sub(consumption)
        .ok_or_else(|| overflow("food after eating"))?;
    agent.food = remaining.max(Decimal::ZERO);
    Ok(consumption)
}

/// Whether the agent may breed this tick.
///
/// All four conditions must hold:
/// - `food >= food_to_breed + breeding_surplus_margin`
/// - `age > minimum_breeding_age`
/// - `pollution_percentage > 100 - foresight`
/// - `total_food > population_size x breeding_reserve_per_capita`
pub fn check_spawn(
    agent: &AgentState,
    env: &Environment,
    population_size: u64,
    config: &LifecycleConfig,
) -> Result<bool, AgentError> {
    let food_needed = agent
        .food_to_breed
        .checked_add(config.breeding_surplus_margin)
        .ok_or_else(|| overflow("breeding food requirement"))?;
    if agent.food < food_needed {
        return Ok(false);
    }
    if agent.age <= config.minimum_breeding_age {
        return Ok(false);
    }
    let foresight_gap = Decimal::ONE_HUNDRED
        .checked_sub(agent.traits.foresight.value())
        .ok_or_else(|| overflow("foresight gap"))?;
    if env.pollution_percentage() <= foresight_gap {
        return Ok(false);
    }
    let reserve = Decimal::from(population_size)
        .checked_mul(config.breeding_reserve_per_capita)
        .ok_or_else(|| overflow("breeding reserve"))?;
    Ok(env.total_food() > reserve)
}

/// Pay the breeding cost and return the parent snapshot for the child.
///
/// Callers must check eligibility first with [`check_spawn`].
pub fn breed(agent: &mut AgentState) -> Result<Lineage, AgentError> {
    let remaining = agent
        .food
        .checked_sub(agent.food_to_breed)
        .ok_or_else(|| overflow("food after breeding"))?;
    if remaining < Decimal::ZERO {
        return Err(AgentError::InvariantViolation {
            agent_id: agent.agent_id,
            field: "food",
            value: remaining,
        });
    }
    agent.food = remaining;
    Ok(agent.lineage_snapshot())
}

/// The strategy an agent with `traits` picks under the given conditions.
///
/// - Renewable if pollution is past the agent's foresight horizon and the
///   remaining headroom is smaller than its altruism.
/// - Otherwise Renewable if the population's average lifespan is below both
///   foresight and altruism.
/// - Otherwise Extractive.
pub fn decide_energy_source(
    traits: &Traits,
    pollution_percentage: Decimal,
    average_lifespan: Decimal,
) -> EnergySource {
    let foresight = traits.foresight.value();
    let altruism = traits.altruism.value();
    // Both operands are bounded to [0, 100], so these cannot overflow.
    let horizon = Decimal::ONE_HUNDRED.saturating_sub(foresight);
    let headroom = Decimal::ONE_HUNDRED.saturating_sub(pollution_percentage);
    let calamity_foreseen = pollution_percentage > horizon && headroom < altruism;
    let lifespans_failing = average_lifespan < foresight && average_lifespan < altruism;
    if calamity_foreseen || lifespans_failing {
        EnergySource::Renewable
    } else {
        EnergySource::Extractive
    }
}

/// Re-evaluate the agent's strategy. Returns the new strategy if it changed.
pub fn check_calamity(agent: &mut AgentState, env: &Environment) -> Option<EnergySource> {
    let decided = decide_energy_source(
        &agent.traits,
        env.pollution_percentage(),
        env.average_lifespan(),
    );
    if decided == agent.energy_source {
        return None;
    }
    tracing::debug!(
        agent_id = %agent.agent_id,
        from = %agent.energy_source,
        to = %decided,
        pollution_percentage = %env.pollution_percentage(),
        "strategy switch"
    );
    agent.energy_source = decided;
    Some(decided)
}

/// Draw food from the shared pool according to the agent's strategy.
///
/// Nothing moves unless the pool exceeds the viability threshold; in that
/// case pollution decays passively by half the extractive penalty. Every
/// transfer is recorded on both sides of `ledger`.
pub fn gather_food(
    agent: &mut AgentState,
    env: &mut Environment,
    config: &LifecycleConfig,
    random: &mut RandomSource,
    ledger: &mut GatherLedger,
) -> Result<GatherOutcome, AgentError> {
    let cleanup = config.renewable_cleanup()?;
    let threshold = config.viability_threshold()?;
    if env.total_food() <= threshold {
        tracing::debug!(
            agent_id = %agent.agent_id,
            total_food = %env.total_food(),
            threshold = %threshold,
            "gather skipped, pool below viability threshold"
        );
        env.passive_decay(cleanup)?;
        return Ok(GatherOutcome::Skipped);
    }

    let variance = random.symmetric(config.yield_variance)?;
    let base = config
        .solar_yield
        .checked_add(variance)
        .ok_or_else(|| overflow("solar yield"))?
        .max(Decimal::ZERO);
    let requested = match agent.energy_source {
        EnergySource::Renewable => base,
        EnergySource::Extractive => base
            .checked_add(config.extractive_bonus)
            .ok_or_else(|| overflow("extractive yield"))?,
    };

    let gain = env.withdraw_food(requested)?;
    ledger.record_debit(gain)?;
    agent.food = agent
        .food
        .checked_add(gain)
        .ok_or_else(|| overflow("food after gathering"))?;
    ledger.record_credit(gain)?;

    match agent.energy_source {
        EnergySource::Renewable => env.remove_pollution(cleanup)?,
        EnergySource::Extractive => env.add_pollution(config.extractive_penalty)?,
    }

    Ok(GatherOutcome::Gathered { gain })
}

/// Apply one direction of an encounter: `target` may be nudged toward
/// altruism by an agent with `influencer_charisma`.
///
/// Influence lands only when the influencer's charisma strictly exceeds the
/// target's trust. Returns whether the target was influenced.
pub fn resolve_encounter(
    target: &mut AgentState,
    influencer_charisma: TraitScore,
    config: &LifecycleConfig,
) -> Result<bool, AgentError> {
    if influencer_charisma <= target.traits.trust {
        return Ok(false);
    }
    target.traits.altruism = target
        .traits
        .altruism
        .checked_shift(config.influence_bonus)
        .ok_or_else(|| overflow("altruism influence"))?;
    Ok(true)
}

/// Add one tick of age.
pub fn advance_age(agent: &mut AgentState, config: &LifecycleConfig) -> Result<(), AgentError> {
    agent.age = agent
        .age
        .checked_add(config.aging_rate)
        .ok_or_else(|| overflow("age"))?;
    Ok(())
}

/// Verify that every quantity on the agent is non-negative.
///
/// Trait bounds are guaranteed by [`TraitScore`] and need no check.
pub fn check_invariants(agent: &AgentState) -> Result<(), AgentError> {
    for (field, value) in [
        ("food", agent.food),
        ("age", agent.age),
        ("lifespan", agent.lifespan),
        ("food_to_breed", agent.food_to_breed),
    ] {
        if value < Decimal::ZERO {
            return Err(AgentError::InvariantViolation {
                agent_id: agent.agent_id,
                field,
                value,
            });
        }
    }
    Ok(())
}
