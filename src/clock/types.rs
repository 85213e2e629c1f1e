/*!
 * Simulated Time
 * Normalized (seconds, nanoseconds) instants on the simulated clock
 */

use crate::core::limits::NANOS_PER_SEC;
use serde::{Deserialize, Serialize};
use std::fmt;

const NANOS_PER_SEC_U64: u64 = NANOS_PER_SEC as u64;

/// A point on the simulated clock, or a span of simulated time.
///
/// `nanos` is always in `[0, 1e9)`; anything beyond carries into `seconds`.
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SimTime {
    seconds: u32,
    nanos: u32,
}

impl SimTime {
    pub const ZERO: SimTime = SimTime {
        seconds: 0,
        nanos: 0,
    };

    pub const MAX: SimTime = SimTime {
        seconds: u32::MAX,
        nanos: NANOS_PER_SEC - 1,
    };

    /// Build a normalized instant, carrying excess nanoseconds into seconds
    ///
    /// # Example
    /// ```
    /// use oss_scheduler::SimTime;
    ///
    /// let t = SimTime::new(1, 1_500_000_000);
    /// assert_eq!((t.seconds(), t.nanos()), (2, 500_000_000));
    /// ```
    pub fn new(seconds: u32, nanos: u32) -> Self {
        Self::from_nanos(seconds as u64 * NANOS_PER_SEC_U64 + nanos as u64)
    }

    /// Build from a total nanosecond count, saturating at [`SimTime::MAX`]
    pub fn from_nanos(total: u64) -> Self {
        let seconds = total / NANOS_PER_SEC_U64;
        if seconds > u32::MAX as u64 {
            return Self::MAX;
        }
        Self {
            seconds: seconds as u32,
            nanos: (total % NANOS_PER_SEC_U64) as u32,
        }
    }

    /// Convert fractional seconds by truncation, never rounding.
    ///
    /// The whole part becomes `seconds`; the fractional part is scaled to
    /// nanoseconds and truncated, so binary floating point can lose the last
    /// nanosecond. Negative or NaN input maps to zero, oversized input
    /// saturates.
    ///
    /// # Example
    /// ```
    /// use oss_scheduler::SimTime;
    ///
    /// let t = SimTime::from_secs_f64(2.5);
    /// assert_eq!((t.seconds(), t.nanos()), (2, 500_000_000));
    /// ```
    pub fn from_secs_f64(secs: f64) -> Self {
        if !(secs > 0.0) {
            return Self::ZERO;
        }
        if secs >= u32::MAX as f64 + 1.0 {
            return Self::MAX;
        }
        let whole = secs.trunc();
        let fractional = secs - whole;
        let nanos = (fractional * NANOS_PER_SEC as f64) as u32;
        Self {
            seconds: whole as u32,
            nanos: nanos.min(NANOS_PER_SEC - 1),
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Total nanoseconds since the clock origin
    pub fn as_nanos(&self) -> u64 {
        self.seconds as u64 * NANOS_PER_SEC_U64 + self.nanos as u64
    }

    /// Add a nanosecond amount with carry into seconds
    pub fn saturating_add_nanos(self, amount: u64) -> Self {
        let total = (self.nanos as u64).saturating_add(amount);
        let seconds = self.seconds as u64 + total / NANOS_PER_SEC_U64;
        if seconds > u32::MAX as u64 {
            return Self::MAX;
        }
        Self {
            seconds: seconds as u32,
            nanos: (total % NANOS_PER_SEC_U64) as u32,
        }
    }

    pub fn saturating_add(self, span: SimTime) -> Self {
        self.saturating_add_nanos(span.as_nanos())
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.seconds, self.nanos)
    }
}
