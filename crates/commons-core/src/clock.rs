//! Simulation clock and tick phase tracking.
//!
//! The clock is the single source of truth for temporal state: the number
//! of the last tick that ran, and which phase of the current tick is in
//! progress. A tick is the total-order sequence
//!
//! 1. [`TickPhase::AgentStep`] -- every agent in the id snapshot steps
//! 2. [`TickPhase::Encounters`] -- reported encounter pairs resolve
//! 3. [`TickPhase::ApplyLifecycle`] -- staged births and deaths apply
//! 4. [`TickPhase::Environment`] -- shared aggregates recompute
//!
//! and between ticks the clock sits in [`TickPhase::Idle`]. Nothing
//! suspends inside a tick.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// A phase transition was attempted out of order.
    #[error("invalid phase transition from {from:?} to {to:?}")]
    PhaseOrder {
        /// The phase the clock was in.
        from: TickPhase,
        /// The phase that was requested.
        to: TickPhase,
    },
}

/// The phases of a tick, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TickPhase {
    /// Between ticks. Encounters may be reported, founders injected, and
    /// configuration staged.
    Idle,
    /// Per-agent local step.
    AgentStep,
    /// Encounter resolution.
    Encounters,
    /// Staged births and deaths are applied.
    ApplyLifecycle,
    /// Environment aggregates are recomputed.
    Environment,
}

impl TickPhase {
    /// The phase that must follow this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::AgentStep,
            Self::AgentStep => Self::Encounters,
            Self::Encounters => Self::ApplyLifecycle,
            Self::ApplyLifecycle => Self::Environment,
            Self::Environment => Self::Idle,
        }
    }
}

/// Discrete simulation clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    /// Number of the last tick started (0 before the first tick).
    tick: u64,
    /// Phase currently in progress.
    phase: TickPhase,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    /// Create a clock at tick 0, idle.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            phase: TickPhase::Idle,
        }
    }

    /// Create an idle clock at an explicit tick (useful for testing).
    pub const fn from_tick(tick: u64) -> Self {
        Self {
            tick,
            phase: TickPhase::Idle,
        }
    }

    /// Start a new tick: advance the counter and enter the agent phase.
    /// Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PhaseOrder`] if a tick is already in progress,
    /// or [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn begin_tick(&mut self) -> Result<u64, ClockError> {
        if self.phase != TickPhase::Idle {
            return Err(ClockError::PhaseOrder {
                from: self.phase,
                to: TickPhase::AgentStep,
            });
        }
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.phase = TickPhase::AgentStep;
        Ok(self.tick)
    }

    /// Move to `phase`, which must be the successor of the current phase.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PhaseOrder`] for any other transition.
    pub fn enter(&mut self, phase: TickPhase) -> Result<(), ClockError> {
        if self.phase.next() != phase {
            return Err(ClockError::PhaseOrder {
                from: self.phase,
                to: phase,
            });
        }
        self.phase = phase;
        Ok(())
    }

    /// Finish the current tick and return to idle.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PhaseOrder`] unless the environment phase was
    /// the last one entered.
    pub fn end_tick(&mut self) -> Result<(), ClockError> {
        self.enter(TickPhase::Idle)
    }

    /// Force the clock back to idle after a failed tick.
    pub const fn abort_tick(&mut self) {
        self.phase = TickPhase::Idle;
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the phase in progress.
    pub const fn phase(&self) -> TickPhase {
        self.phase
    }

    /// Whether the clock is between ticks.
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, TickPhase::Idle)
    }
}
