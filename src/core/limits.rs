/*!
 * System Limits and Constants
 *
 * Defaults for the controller loop, the process table and the shared clock.
 */

use std::time::Duration;

// =============================================================================
// SIMULATED TIME
// =============================================================================

/// Nanoseconds in one simulated second
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Simulated time added on every controller tick (10us)
pub const DEFAULT_TICK_INCREMENT_NS: u32 = 10_000;

/// Simulated time between process table reports (0.5s)
pub const DEFAULT_REPORT_INTERVAL_NS: u64 = 500_000_000;

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Number of PCB slots; also the upper bound for `-s`
pub const PROCESS_TABLE_CAPACITY: usize = 10;

// =============================================================================
// CANCELLATION
// =============================================================================

/// Wall-clock budget for a whole controller run
pub const DEFAULT_WATCHDOG: Duration = Duration::from_secs(60);

// =============================================================================
// SHARED CLOCK & WORKER LOOKUP
// =============================================================================

/// POSIX shared memory object holding the clock
pub const DEFAULT_SHM_NAME: &str = "/oss-sim-clock";

/// Environment variable carrying the clock object name to workers
pub const CLOCK_SHM_ENV: &str = "OSS_CLOCK_SHM";

/// Environment variable overriding the worker executable
pub const WORKER_PATH_ENV: &str = "OSS_WORKER_PATH";

/// Worker executable name looked up next to the controller binary
pub const WORKER_BINARY_NAME: &str = "worker";

/// Environment variable switching log output to JSON
pub const TRACE_JSON_ENV: &str = "OSS_TRACE_JSON";
