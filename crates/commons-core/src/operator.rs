//! Operator control state for runtime simulation management.
//!
//! This module provides shared state used by the tick loop and whatever
//! front-end controls it. The operator can pause/resume, change tick speed,
//! stage new tunables, request founders, and trigger a clean shutdown --
//! all without stopping the process.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so the tick loop reads them
//! without locks on the hot path. Staged tunables sit behind a
//! [`tokio::sync::Mutex`]. Everything here is observed only between ticks.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::{SimulationBoundsConfig, Tunables};

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An operator issued a stop command.
    OperatorStop,
    /// All agents are dead and recovery is disabled.
    Extinction,
}

/// Shared operator control state.
///
/// Wrapped in [`Arc`](std::sync::Arc) and shared between the tick loop and
/// its controllers.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Notification used to wake the tick loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Population floor that triggers founder injection (0 = disabled).
    min_population: u32,

    /// Founders requested by the operator, injected at the next boundary.
    pending_founders: AtomicU32,

    /// Tunables waiting to be handed to the simulation.
    staged_tunables: Mutex<Option<Tunables>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            min_population: bounds.min_population,
            pending_founders: AtomicU32::new(0),
            staged_tunables: Mutex::new(None),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The tick loop will sleep until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the simulation is no longer paused.
    ///
    /// Returns immediately if not paused.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop. Also wakes a paused loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Zero runs ticks back to back.
    /// Returns the previous interval.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Configuration and founders
    // -----------------------------------------------------------------------

    /// Stage tunables for the next tick boundary, replacing any not yet
    /// taken. Validation happens when the loop hands them to the simulation.
    pub async fn stage_tunables(&self, tunables: &Tunables) {
        let mut guard = self.staged_tunables.lock().await;
        *guard = Some(tunables.clone());
    }

    /// Take the staged tunables, if any.
    pub async fn take_staged_tunables(&self) -> Option<Tunables> {
        self.staged_tunables.lock().await.take()
    }

    /// Ask for `count` founders at the next tick boundary.
    ///
    /// Requests accumulate until taken, saturating at `u32::MAX`. Returns the
    /// total now pending.
    pub fn request_founders(&self, count: u32) -> u32 {
        let mut current = self.pending_founders.load(Ordering::Acquire);
        loop {
            let updated = current.saturating_add(count);
            match self.pending_founders.compare_exchange_weak(
                current,
                updated,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return updated,
                Err(actual) => current = actual,
            }
        }
    }

    /// Take every requested founder, leaving zero.
    pub fn take_requested_founders(&self) -> u32 {
        self.pending_founders.swap(0, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Founders needed to bring `population` back to the floor.
    ///
    /// Returns 0 when recovery is disabled or the floor is met.
    pub fn recovery_shortfall(&self, population: u64) -> u32 {
        let floor = u64::from(self.min_population);
        let missing = floor.saturating_sub(population);
        u32::try_from(missing).unwrap_or(u32::MAX)
    }

    /// Whether extinction ends the run (no recovery floor configured).
    pub const fn extinction_is_terminal(&self) -> bool {
        self.min_population == 0
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured population floor.
    pub const fn min_population(&self) -> u32 {
        self.min_population
    }

    /// Build a status report for a simulation at `tick` with the given
    /// population counts.
    pub async fn status(&self, tick: u64, agents_alive: u64, agents_total: u64) -> SimulationStatus {
        SimulationStatus {
            tick,
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            min_population: self.min_population,
            agents_alive,
            agents_total,
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON-serializable status of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured population floor (0 = no recovery).
    pub min_population: u32,
    /// Number of agents currently alive.
    pub agents_alive: u64,
    /// Total agents ever created.
    pub agents_total: u64,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// ISO 8601 timestamp of when the simulation started.
    pub started_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn bounds(max_ticks: u64, min_population: u32) -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_ticks,
            min_population,
            ..SimulationBoundsConfig::default()
        }
    }

    #[test]
    fn initial_state_is_not_paused() {
        let state = OperatorState::new(100, &bounds(0, 0));
        assert!(!state.is_paused());
        assert!(!state.is_stop_requested());
    }

    #[test]
    fn pause_and_resume() {
        let state = OperatorState::new(100, &bounds(0, 0));
        state.pause();
        assert!(state.is_paused());
        state.resume();
        assert!(!state.is_paused());
    }

    #[test]
    fn stop_clears_pause() {
        let state = OperatorState::new(100, &bounds(0, 0));
        state.pause();
        state.request_stop();
        assert!(state.is_stop_requested());
        assert!(!state.is_paused());
    }

    #[test]
    fn set_tick_interval() {
        let state = OperatorState::new(100, &bounds(0, 0));
        assert_eq!(state.set_tick_interval_ms(0), 100);
        assert_eq!(state.tick_interval_ms(), 0);
    }

    #[test]
    fn tick_limit_zero_means_unlimited() {
        let state = OperatorState::new(100, &bounds(0, 0));
        assert!(!state.tick_limit_reached(999_999));
    }

    #[test]
    fn tick_limit_reached() {
        let state = OperatorState::new(100, &bounds(100, 0));
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
        assert!(state.tick_limit_reached(101));
    }

    #[test]
    fn recovery_shortfall() {
        let disabled = OperatorState::new(100, &bounds(0, 0));
        assert_eq!(disabled.recovery_shortfall(0), 0);
        assert!(disabled.extinction_is_terminal());

        let floor = OperatorState::new(100, &bounds(0, 10));
        assert_eq!(floor.recovery_shortfall(4), 6);
        assert_eq!(floor.recovery_shortfall(12), 0);
        assert!(!floor.extinction_is_terminal());
    }

    #[test]
    fn founder_requests_accumulate() {
        let state = OperatorState::new(100, &bounds(0, 0));
        assert_eq!(state.request_founders(3), 3);
        assert_eq!(state.request_founders(2), 5);
        assert_eq!(state.take_requested_founders(), 5);
        assert_eq!(state.take_requested_founders(), 0);
    }

    #[test]
    fn founder_requests_saturate() {
        let state = OperatorState::new(100, &bounds(0, 0));
        state.request_founders(u32::MAX);
        assert_eq!(state.request_founders(7), u32::MAX);
        assert_eq!(state.take_requested_founders(), u32::MAX);
    }

    #[test]
    fn concurrent_founder_requests_are_all_counted() {
        let state = Arc::new(OperatorState::new(100, &bounds(0, 0)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        state.request_founders(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.take_requested_founders(), 800);
    }

    #[tokio::test]
    async fn staged_tunables_are_taken_once() {
        let state = OperatorState::new(100, &bounds(0, 0));
        state.stage_tunables(&Tunables::default()).await;
        assert!(state.take_staged_tunables().await.is_some());
        assert!(state.take_staged_tunables().await.is_none());
    }

    #[tokio::test]
    async fn status_reports_end_reason() {
        let state = OperatorState::new(100, &bounds(50, 0));
        state.set_end_reason(SimulationEndReason::Extinction).await;
        let status = state.status(7, 0, 12).await;
        assert_eq!(status.tick, 7);
        assert_eq!(status.max_ticks, 50);
        assert_eq!(status.end_reason, Some(SimulationEndReason::Extinction));
    }
}
