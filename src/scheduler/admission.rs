/*!
 * Admission Control
 *
 * Decides, once per tick, whether a new worker may launch: the total quota,
 * the concurrency limit and the simulated-time launch interval must all
 * allow it.
 */

use super::config::SchedulerConfig;
use crate::clock::SimTime;
use serde::{Deserialize, Serialize};

/// Counters the controller carries between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdmissionState {
    /// Launch attempts counted against the quota
    pub launched: u32,
    /// Workers currently registered in the table
    pub running: u32,
    /// Attempts that failed to spawn (skip policy only)
    pub failed: u32,
    /// Earliest simulated time of the next launch
    pub next_allowed_launch: SimTime,
}

impl AdmissionState {
    /// The interval is measured from the simulated time of this launch,
    /// never from when the previous gap expired.
    pub fn record_launch(&mut self, now: SimTime, gap: SimTime) {
        self.launched += 1;
        self.running += 1;
        self.next_allowed_launch = now.saturating_add(gap);
    }

    pub fn record_failed_launch(&mut self, now: SimTime, gap: SimTime) {
        self.launched += 1;
        self.failed += 1;
        self.next_allowed_launch = now.saturating_add(gap);
    }

    pub fn record_exit(&mut self) {
        debug_assert!(self.running > 0, "exit recorded with no running workers");
        self.running = self.running.saturating_sub(1);
    }
}

/// The three admission limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    total_workers: u32,
    max_concurrent: u32,
    launch_gap: SimTime,
}

impl AdmissionPolicy {
    pub fn new(total_workers: u32, max_concurrent: u32, launch_gap: SimTime) -> Self {
        Self {
            total_workers,
            max_concurrent,
            launch_gap,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(
            config.total_workers,
            config.max_concurrent,
            config.launch_gap(),
        )
    }

    pub fn launch_gap(&self) -> SimTime {
        self.launch_gap
    }

    /// Whether a launch is allowed at `now`
    pub fn admits(&self, state: &AdmissionState, now: SimTime) -> bool {
        state.launched < self.total_workers
            && state.running < self.max_concurrent
            && now >= state.next_allowed_launch
    }

    /// The run continues while quota remains or workers are still alive
    pub fn has_work(&self, state: &AdmissionState) -> bool {
        state.launched < self.total_workers || state.running > 0
    }
}
