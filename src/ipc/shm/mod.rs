/*!
 * Shared Memory Module
 * The simulated clock as a POSIX shared memory object
 */

pub mod segment;
pub mod types;

pub use segment::{ShmClockOwner, ShmClockView};
pub use types::{validate_name, ShmError, ShmPermission, ShmResult, CLOCK_REGION_LEN};
