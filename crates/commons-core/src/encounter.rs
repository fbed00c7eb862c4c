//! Encounter reporting.
//!
//! The core does not know where agents are. An external spatial system
//! decides which agents touched and reports each pair, either directly via
//! [`Simulation::report_encounter`](crate::simulation::Simulation::report_encounter)
//! or by implementing [`EncounterSource`], which the runner polls once
//! between ticks.
//!
//! Reported pairs are collected in an [`EncounterQueue`]. A pair is
//! unordered (both directions are evaluated when it resolves), so `(a, b)`
//! and `(b, a)` reported in the same tick collapse to one entry.

use std::collections::BTreeSet;

use commons_types::AgentId;

/// An unordered pair of distinct agents that met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncounterPair {
    low: AgentId,
    high: AgentId,
}

impl EncounterPair {
    /// Normalise `(a, b)`. Returns `None` for a self-pair.
    pub fn new(a: AgentId, b: AgentId) -> Option<Self> {
        match a.cmp(&b) {
            core::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            core::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// The older agent of the pair.
    pub const fn first(&self) -> AgentId {
        self.low
    }

    /// The younger agent of the pair.
    pub const fn second(&self) -> AgentId {
        self.high
    }
}

/// Deduplicated set of pairs reported for the next tick.
#[derive(Debug, Clone, Default)]
pub struct EncounterQueue {
    pairs: BTreeSet<EncounterPair>,
}

impl EncounterQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Returns `false` if it was already queued.
    pub fn push(&mut self, pair: EncounterPair) -> bool {
        self.pairs.insert(pair)
    }

    /// Number of distinct pairs queued.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Take every queued pair in a stable order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<EncounterPair> {
        std::mem::take(&mut self.pairs).into_iter().collect()
    }
}

/// A source of encounter reports, polled once between ticks.
///
/// Implementations see the live ids for the upcoming tick and return the
/// pairs they observed. Invalid pairs are rejected individually by the
/// simulation; they do not abort the run.
pub trait EncounterSource {
    /// Collect the pairs to report before tick `tick`.
    fn collect_encounters(&mut self, tick: u64, live: &[AgentId]) -> Vec<(AgentId, AgentId)>;
}

/// A source that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncounters;

impl EncounterSource for NoEncounters {
    fn collect_encounters(&mut self, _tick: u64, _live: &[AgentId]) -> Vec<(AgentId, AgentId)> {
        Vec::new()
    }
}

/// A source that replays a fixed script: tick number to pairs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEncounters {
    script: std::collections::BTreeMap<u64, Vec<(AgentId, AgentId)>>,
}

impl ScriptedEncounters {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `(a, b)` before tick `tick`.
    #[must_use]
    pub fn with(mut self, tick: u64, a: AgentId, b: AgentId) -> Self {
        self.script.entry(tick).or_default().push((a, b));
        self
    }
}

impl EncounterSource for ScriptedEncounters {
    fn collect_encounters(&mut self, tick: u64, _live: &[AgentId]) -> Vec<(AgentId, AgentId)> {
        self.script.remove(&tick).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered() {
        let ab = EncounterPair::new(AgentId::new(1), AgentId::new(2));
        let ba = EncounterPair::new(AgentId::new(2), AgentId::new(1));
        assert_eq!(ab, ba);
        assert_eq!(ab.map(|p| p.first()), Some(AgentId::new(1)));
    }

    #[test]
    fn self_pair_is_none() {
        assert!(EncounterPair::new(AgentId::new(4), AgentId::new(4)).is_none());
    }

    #[test]
    fn queue_collapses_duplicates() {
        let mut queue = EncounterQueue::new();
        let pair = EncounterPair::new(AgentId::new(1), AgentId::new(2));
        let reversed = EncounterPair::new(AgentId::new(2), AgentId::new(1));
        assert!(pair.is_some_and(|p| queue.push(p)));
        assert!(!reversed.is_some_and(|p| queue.push(p)));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn scripted_source_replays_by_tick() {
        let mut source = ScriptedEncounters::new().with(2, AgentId::new(0), AgentId::new(1));
        assert!(source.collect_encounters(1, &[]).is_empty());
        assert_eq!(source.collect_encounters(2, &[]).len(), 1);
        assert!(source.collect_encounters(2, &[]).is_empty());
    }

    #[test]
    fn no_encounters_is_empty() {
        assert!(NoEncounters.collect_encounters(1, &[AgentId::new(0)]).is_empty());
    }
}
