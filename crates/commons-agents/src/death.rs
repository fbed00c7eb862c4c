//! Death conditions.
//!
//! An agent dies when its food buffer is exhausted or its age reaches its
//! lifespan. Both causes have the same consequence (removal at the end of
//! the tick); when both hold at once the death is reported as starvation.

use rust_decimal::Decimal;

use commons_types::{AgentState, DeathCause, DeathRecord};

/// Check whether an agent meets any death condition.
///
/// Returns `Some(cause)` if the agent is dead, `None` if alive. This only
/// inspects the current state.
pub fn check_death(state: &AgentState) -> Option<DeathCause> {
    if state.food <= Decimal::ZERO {
        return Some(DeathCause::Starvation);
    }
    if state.age >= state.lifespan {
        return Some(DeathCause::OldAge);
    }
    None
}

/// Build the record published for a dead agent.
pub const fn death_record(state: &AgentState, cause: DeathCause) -> DeathRecord {
    DeathRecord {
        agent_id: state.agent_id,
        cause,
        age: state.age,
        generation: state.generation,
    }
}

#[cfg(test)]
mod tests {
    use commons_types::{AgentId, EnergySource, Traits};
    use rust_decimal_macros::dec;

    use super::*;

    fn agent(food: Decimal, age: Decimal, lifespan: Decimal) -> AgentState {
        AgentState {
            agent_id: AgentId::new(1),
            name: String::from("Agent1"),
            traits: Traits::default(),
            energy_source: EnergySource::Extractive,
            food,
            age,
            lifespan,
            food_to_breed: dec!(50),
            generation: 2,
            born_at_tick: 0,
            lineage: None,
        }
    }

    #[test]
    fn healthy_agent_is_alive() {
        assert_eq!(check_death(&agent(dec!(1), dec!(5), dec!(100))), None);
    }

    #[test]
    fn empty_buffer_is_starvation() {
        assert_eq!(
            check_death(&agent(Decimal::ZERO, dec!(5), dec!(100))),
            Some(DeathCause::Starvation)
        );
    }

    #[test]
    fn reaching_lifespan_is_old_age() {
        assert_eq!(
            check_death(&agent(dec!(10), dec!(100), dec!(100))),
            Some(DeathCause::OldAge)
        );
    }

    #[test]
    fn both_conditions_report_starvation() {
        assert_eq!(
            check_death(&agent(Decimal::ZERO, dec!(120), dec!(100))),
            Some(DeathCause::Starvation)
        );
    }

    #[test]
    fn record_copies_age_and_generation() {
        let dead = agent(Decimal::ZERO, dec!(12.3), dec!(100));
        let record = death_record(&dead, DeathCause::Starvation);
        assert_eq!(record.age, dec!(12.3));
        assert_eq!(record.generation, 2);
    }
}
