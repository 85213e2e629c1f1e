/*!
 * Scheduler Configuration
 *
 * Admission limits from the command line plus run-time tunables for the
 * controller loop.
 */

use crate::clock::SimTime;
use crate::core::errors::{OssError, OssResult};
use crate::core::limits::{
    DEFAULT_REPORT_INTERVAL_NS, DEFAULT_TICK_INCREMENT_NS, DEFAULT_WATCHDOG,
    PROCESS_TABLE_CAPACITY,
};
use crate::process::{SpawnFailurePolicy, WorkBudget};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Admission limits for one run. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Workers to launch over the whole run (`-n`)
    pub total_workers: u32,
    /// Workers alive at the same time (`-s`)
    pub max_concurrent: u32,
    /// Simulated seconds each worker runs (`-t`)
    pub worker_duration: f64,
    /// Minimum simulated seconds between launches (`-i`)
    pub launch_interval: f64,
}

impl SchedulerConfig {
    pub fn new(
        total_workers: u32,
        max_concurrent: u32,
        worker_duration: f64,
        launch_interval: f64,
    ) -> Self {
        Self {
            total_workers,
            max_concurrent,
            worker_duration,
            launch_interval,
        }
    }

    /// Check every range, including that the table can hold
    /// `max_concurrent` workers.
    pub fn validate(&self, settings: &ControllerSettings) -> OssResult<()> {
        if self.max_concurrent < 1 {
            return Err(OssError::Configuration(
                "-s must be a positive integer".to_string(),
            ));
        }
        if self.max_concurrent as usize > settings.table_capacity {
            return Err(OssError::Configuration(format!(
                "-s {} exceeds the process table capacity of {}",
                self.max_concurrent, settings.table_capacity
            )));
        }
        check_seconds("-t", self.worker_duration)?;
        check_seconds("-i", self.launch_interval)?;
        settings.validate()
    }

    /// Budget handed to every worker
    pub fn worker_budget(&self) -> WorkBudget {
        WorkBudget::from_secs_f64(self.worker_duration)
    }

    /// Simulated gap enforced between launches
    pub fn launch_gap(&self) -> SimTime {
        SimTime::from_secs_f64(self.launch_interval)
    }
}

fn check_seconds(flag: &str, value: f64) -> OssResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(OssError::Configuration(format!(
            "{} must be a non-negative number of seconds, got {}",
            flag, value
        )));
    }
    if value >= u32::MAX as f64 {
        return Err(OssError::Configuration(format!(
            "{} of {} seconds does not fit the simulated clock",
            flag, value
        )));
    }
    Ok(())
}

/// Controller tunables outside the admission contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControllerSettings {
    /// Simulated nanoseconds added per tick
    pub tick_increment_ns: u32,
    /// Simulated nanoseconds between table reports
    pub report_interval_ns: u64,
    /// Number of PCB slots
    pub table_capacity: usize,
    /// Wall-clock limit for the run
    pub watchdog: Duration,
    pub spawn_failure: SpawnFailurePolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_increment_ns: DEFAULT_TICK_INCREMENT_NS,
            report_interval_ns: DEFAULT_REPORT_INTERVAL_NS,
            table_capacity: PROCESS_TABLE_CAPACITY,
            watchdog: DEFAULT_WATCHDOG,
            spawn_failure: SpawnFailurePolicy::Abort,
        }
    }
}

impl ControllerSettings {
    pub fn with_tick_increment(mut self, nanos: u32) -> Self {
        self.tick_increment_ns = nanos;
        self
    }

    pub fn with_report_interval(mut self, nanos: u64) -> Self {
        self.report_interval_ns = nanos;
        self
    }

    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = watchdog;
        self
    }

    pub fn with_spawn_failure(mut self, policy: SpawnFailurePolicy) -> Self {
        self.spawn_failure = policy;
        self
    }

    pub fn validate(&self) -> OssResult<()> {
        if self.tick_increment_ns == 0 {
            return Err(OssError::Configuration(
                "tick increment must be positive".to_string(),
            ));
        }
        if self.report_interval_ns == 0 {
            return Err(OssError::Configuration(
                "report interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.tick_increment_ns, 10_000);
        assert_eq!(settings.report_interval_ns, 500_000_000);
        assert_eq!(settings.table_capacity, 10);
        assert_eq!(settings.watchdog, Duration::from_secs(60));
        assert_eq!(settings.spawn_failure, SpawnFailurePolicy::Abort);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config = SchedulerConfig::new(3, 0, 1.0, 0.0);
        let err = config.validate(&ControllerSettings::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_capacity_bound_is_inclusive() {
        let settings = ControllerSettings::default();
        assert!(SchedulerConfig::new(3, 10, 1.0, 0.0).validate(&settings).is_ok());
        assert!(SchedulerConfig::new(3, 11, 1.0, 0.0).validate(&settings).is_err());
    }

    #[test]
    fn test_rejects_bad_durations() {
        let settings = ControllerSettings::default();
        assert!(SchedulerConfig::new(1, 1, -0.5, 0.0).validate(&settings).is_err());
        assert!(SchedulerConfig::new(1, 1, 1.0, f64::NAN).validate(&settings).is_err());
        assert!(SchedulerConfig::new(1, 1, f64::INFINITY, 0.0).validate(&settings).is_err());
    }

    #[test]
    fn test_rejects_zero_tick() {
        let settings = ControllerSettings::default().with_tick_increment(0);
        assert!(SchedulerConfig::new(1, 1, 1.0, 0.0).validate(&settings).is_err());
    }
}
