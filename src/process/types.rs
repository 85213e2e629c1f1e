/*!
 * Process Types
 * Common types for worker launching and tracking
 */

use crate::clock::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a worker runs, in simulated time, as the two integers passed on
/// its command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkBudget {
    pub seconds: u32,
    pub nanos: u32,
}

impl WorkBudget {
    /// Normalizes `nanos` overflow into `seconds`
    pub fn new(seconds: u32, nanos: u32) -> Self {
        SimTime::new(seconds, nanos).into()
    }

    /// Split fractional seconds into whole seconds plus a nanosecond
    /// remainder. The remainder is truncated, not rounded.
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime::from_secs_f64(secs).into()
    }

    pub fn as_sim_time(&self) -> SimTime {
        SimTime::new(self.seconds, self.nanos)
    }

    /// Command line arguments for the worker executable
    pub fn to_args(&self) -> [String; 2] {
        [self.seconds.to_string(), self.nanos.to_string()]
    }
}

impl From<SimTime> for WorkBudget {
    fn from(time: SimTime) -> Self {
        Self {
            seconds: time.seconds(),
            nanos: time.nanos(),
        }
    }
}

impl fmt::Display for WorkBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seconds, {} nanoseconds", self.seconds, self.nanos)
    }
}

/// What the controller does when a worker cannot be spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SpawnFailurePolicy {
    /// End the whole run with the spawn error
    #[default]
    Abort,
    /// Count the attempt against the quota and keep scheduling
    #[value(name = "skip")]
    SkipAndContinue,
}
