//! Construction of newborn agents: children from a parent snapshot and
//! founders from scratch.
//!
//! The population assigns ids and birth ticks; this module only decides the
//! newborn's values and its placement hint.

use rust_decimal::Decimal;

use commons_types::{
    AgentId, AgentState, EnergySource, Lineage, PlacementAnchor, PlacementRequest, TraitScore,
    Traits,
};

use crate::config::{FounderConfig, LifecycleConfig};
use crate::error::{AgentError, overflow};
use crate::random::RandomSource;

/// Diagnostic name for an agent with the given id.
pub fn agent_name(agent_id: AgentId) -> String {
    format!("Agent{}", agent_id.into_inner())
}

/// Mutate each parent trait by `uniform(-range, +range)`, clamped.
pub fn mutate_traits(
    parent: &Traits,
    mutation_range: Decimal,
    random: &mut RandomSource,
) -> Result<Traits, AgentError> {
    let mut mutate = |score: TraitScore| -> Result<TraitScore, AgentError> {
        let delta = random.symmetric(mutation_range)?;
        score
            .checked_shift(delta)
            .ok_or_else(|| overflow("trait mutation"))
    };
    Ok(Traits {
        altruism: mutate(parent.altruism)?,
        charisma: mutate(parent.charisma)?,
        trust: mutate(parent.trust)?,
        foresight: mutate(parent.foresight)?,
    })
}

/// Build a child from its parent's snapshot.
///
/// - traits: parent trait + `uniform(-trait_mutation_range, +range)`, clamped
/// - energy source: copied
/// - lifespan: `max(0, ((parent.lifespan + uniform(0, lifespan_range)) +
///   average_lifespan) / 2)`
/// - `food_to_breed`: `max(minimum_breed_threshold, parent.food_to_breed +
///   uniform(-food_to_breed_range, +range))`
/// - food: the parent's `food_to_breed` (what the parent paid)
/// - generation: parent + 1
pub fn spawn_child(
    agent_id: AgentId,
    born_at_tick: u64,
    lineage: &Lineage,
    average_lifespan: Decimal,
    config: &LifecycleConfig,
    random: &mut RandomSource,
) -> Result<AgentState, AgentError> {
    let traits = mutate_traits(&lineage.traits, config.trait_mutation_range, random)?;

    let lifespan_bonus = random.uniform(Decimal::ZERO, config.lifespan_range)?;
    let lifespan = lineage
        .lifespan
        .checked_add(lifespan_bonus)
        .and_then(|v| v.checked_add(average_lifespan))
        .and_then(|v| v.checked_div(Decimal::TWO))
        .ok_or_else(|| overflow("child lifespan"))?
        .max(Decimal::ZERO);

    let breed_shift = random.symmetric(config.food_to_breed_range)?;
    let food_to_breed = lineage
        .food_to_breed
        .checked_add(breed_shift)
        .ok_or_else(|| overflow("child food_to_breed"))?
        .max(config.minimum_breed_threshold);

    let generation = lineage
        .parent_generation
        .checked_add(1)
        .ok_or_else(|| overflow("child generation"))?;

    Ok(AgentState {
        agent_id,
        name: agent_name(agent_id),
        traits,
        energy_source: lineage.energy_source,
        food: lineage.food_to_breed.max(Decimal::ZERO),
        age: Decimal::ZERO,
        lifespan,
        food_to_breed,
        generation,
        born_at_tick,
        lineage: Some(lineage.clone()),
    })
}

/// Build a founder: random traits, extractive, lifespan around the current
/// population average.
pub fn spawn_founder(
    agent_id: AgentId,
    born_at_tick: u64,
    average_lifespan: Decimal,
    config: &FounderConfig,
    random: &mut RandomSource,
) -> Result<AgentState, AgentError> {
    let mut draw_trait = || -> Result<TraitScore, AgentError> {
        random
            .uniform(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .map(TraitScore::new)
    };
    let traits = Traits {
        altruism: draw_trait()?,
        charisma: draw_trait()?,
        trust: draw_trait()?,
        foresight: draw_trait()?,
    };

    let lifespan_shift = random.symmetric(config.founder_lifespan_range)?;
    let lifespan = average_lifespan
        .checked_add(lifespan_shift)
        .ok_or_else(|| overflow("founder lifespan"))?
        .max(Decimal::ZERO);

    Ok(AgentState {
        agent_id,
        name: agent_name(agent_id),
        traits,
        energy_source: EnergySource::Extractive,
        food: config.founder_food.max(Decimal::ZERO),
        age: Decimal::ZERO,
        lifespan,
        food_to_breed: config.founder_food_to_breed.max(Decimal::ZERO),
        generation: 0,
        born_at_tick,
        lineage: None,
    })
}

/// Build a placement hint with a jitter drawn from `[-jitter, +jitter]` on
/// each axis.
pub fn placement_request(
    agent_id: AgentId,
    anchor: PlacementAnchor,
    jitter: Decimal,
    random: &mut RandomSource,
) -> Result<PlacementRequest, AgentError> {
    Ok(PlacementRequest {
        agent_id,
        anchor,
        offset_x: random.symmetric(jitter)?,
        offset_y: random.symmetric(jitter)?,
    })
}
