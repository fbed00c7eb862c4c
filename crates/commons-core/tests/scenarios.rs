//! End-to-end behaviour scenarios driven through the public
//! [`Simulation`] API.
//!
//! Each test builds a small, hand-specified world with
//! [`Simulation::from_state`] so the preconditions are exact, then ticks it
//! and checks the observable outcome.

#![allow(clippy::unwrap_used)]

use commons_agents::{FounderConfig, decide_energy_source};
use commons_core::population::Population;
use commons_core::{Simulation, SimulationConfig, SimulationState, Tunables};
use commons_types::{AgentId, AgentState, EnergySource, Traits};
use commons_world::Environment;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn agent(id: u64, traits: Traits) -> AgentState {
    AgentState {
        agent_id: AgentId::new(id),
        name: format!("Agent{id}"),
        traits,
        energy_source: EnergySource::Extractive,
        food: dec!(50),
        age: Decimal::ZERO,
        lifespan: dec!(100),
        food_to_breed: dec!(50),
        generation: 0,
        born_at_tick: 0,
        lineage: None,
    }
}

fn simulation_with(agents: Vec<AgentState>, environment: Environment) -> Simulation {
    let state = SimulationState::new(
        Population::from_agents(agents).unwrap(),
        environment,
        &Tunables::default(),
        FounderConfig::default(),
        dec!(100),
        7,
    );
    Simulation::from_state(state)
}

#[test]
fn young_poor_founder_never_breeds() {
    let mut founder = agent(0, Traits::from_values(dec!(50), dec!(50), dec!(50), dec!(100)));
    founder.food = dec!(10);
    founder.food_to_breed = dec!(80);
    let env = Environment::with_state(dec!(1000000), dec!(5), dec!(1), dec!(100)).unwrap();
    let mut sim = simulation_with(vec![founder], env);

    for _ in 0..100 {
        let summary = sim.tick().unwrap();
        assert!(summary.births.is_empty());
    }
    let snapshot = sim.agent_snapshot(AgentId::new(0)).unwrap();
    assert_eq!(snapshot.generation, 0);
    assert!(snapshot.age < dec!(20));
}

#[test]
fn rich_founder_waits_for_breeding_age() {
    let mut founder = agent(0, Traits::from_values(dec!(50), dec!(50), dec!(50), dec!(100)));
    founder.food = dec!(1000);
    founder.food_to_breed = dec!(80);
    founder.lifespan = dec!(1000);
    let env = Environment::with_state(dec!(1000000), dec!(5), dec!(1), dec!(1000)).unwrap();
    let mut sim = simulation_with(vec![founder], env);

    // Age is 0.1 x (tick - 1) when checked; it first exceeds 20 on tick 202.
    for _ in 0..201 {
        let summary = sim.tick().unwrap();
        assert!(summary.births.is_empty(), "birth at tick {}", summary.tick);
    }
    let summary = sim.tick().unwrap();
    assert_eq!(summary.tick, 202);
    assert_eq!(summary.births.len(), 1);
    assert_eq!(summary.placements.len(), 1);

    let child_id = *summary.births.first().unwrap();
    let child = sim.agent_snapshot(child_id).unwrap();
    assert_eq!(child.generation, 1);
    assert_eq!(child.food, dec!(80));
    assert_eq!(child.age, Decimal::ZERO);
}

#[test]
fn long_sighted_altruist_switches_to_renewable() {
    let traits = Traits::from_values(dec!(90), dec!(50), dec!(50), dec!(90));

    // First branch: 0 > 100 - 90 is false. Second: 50 < 90 and 50 < 90.
    assert_eq!(
        decide_energy_source(&traits, Decimal::ZERO, dec!(50)),
        EnergySource::Renewable
    );

    let env = Environment::with_state(dec!(1000000), Decimal::ZERO, dec!(1), dec!(50)).unwrap();
    let mut sim = simulation_with(vec![agent(0, traits)], env);
    let summary = sim.tick().unwrap();

    assert_eq!(summary.strategy_switches, 1);
    assert_eq!(summary.renewable_agents, 1);
    assert_eq!(
        sim.agent_snapshot(AgentId::new(0)).unwrap().energy_source,
        EnergySource::Renewable
    );
}

#[test]
fn charismatic_agent_influences_trusting_one() {
    let a = agent(0, Traits::from_values(dec!(30), dec!(80), dec!(90), dec!(10)));
    let b = agent(1, Traits::from_values(dec!(50), dec!(10), dec!(20), dec!(10)));
    let env = Environment::with_state(dec!(1000000), Decimal::ZERO, dec!(2), dec!(100)).unwrap();
    let mut sim = simulation_with(vec![a, b], env);

    sim.report_encounter(AgentId::new(0), AgentId::new(1)).unwrap();
    let summary = sim.tick().unwrap();

    assert_eq!(summary.encounters_resolved, 1);
    assert_eq!(summary.influenced, 1);
    let a_after = sim.agent_snapshot(AgentId::new(0)).unwrap();
    let b_after = sim.agent_snapshot(AgentId::new(1)).unwrap();
    assert_eq!(b_after.traits.altruism.value(), dec!(55));
    assert_eq!(a_after.traits.altruism.value(), dec!(30));
}

#[test]
fn influence_is_clamped_at_maximum() {
    let a = agent(0, Traits::from_values(dec!(30), dec!(80), dec!(90), dec!(10)));
    let b = agent(1, Traits::from_values(dec!(98), dec!(10), dec!(20), dec!(10)));
    let env = Environment::with_state(dec!(1000000), Decimal::ZERO, dec!(2), dec!(100)).unwrap();
    let mut sim = simulation_with(vec![a, b], env);

    sim.report_encounter(AgentId::new(1), AgentId::new(0)).unwrap();
    sim.tick().unwrap();

    let b_after = sim.agent_snapshot(AgentId::new(1)).unwrap();
    assert_eq!(b_after.traits.altruism.value(), dec!(100));
}

#[test]
fn empty_pool_yields_nothing() {
    let env = Environment::with_state(Decimal::ZERO, dec!(10), dec!(1), dec!(100)).unwrap();
    let mut sim = simulation_with(
        vec![agent(0, Traits::from_values(dec!(10), dec!(10), dec!(10), dec!(10)))],
        env,
    );

    let summary = sim.tick().unwrap();

    assert_eq!(summary.food_gathered, Decimal::ZERO);
    assert_eq!(summary.gathers_skipped, 1);
    // Pollution still exceeds production, so nothing grows back either.
    assert_eq!(summary.environment.total_food, Decimal::ZERO);
    assert!(sim.agent_snapshot(AgentId::new(0)).unwrap().food < dec!(50));
}

#[test]
fn empty_population_reports_sentinels() {
    let mut config = SimulationConfig::default();
    config.population.initial_agents = 0;
    let mut sim = Simulation::new(&config).unwrap();

    let summary = sim.tick().unwrap();

    assert_eq!(summary.agents_alive, 0);
    assert_eq!(summary.environment.average_lifespan, Decimal::ZERO);
    assert_eq!(summary.environment.pollution_percentage, Decimal::ZERO);
    assert_eq!(summary.environment.food_production, Decimal::ZERO);

    // The world still accepts founders afterwards.
    sim.inject_founders(2).unwrap();
    assert_eq!(sim.population_size(), 2);
    assert!(sim.tick().is_ok());
}
