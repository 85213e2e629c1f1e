/*!
 * Clock Module
 * Simulated time: value type, storage and the controller/worker handles
 */

pub mod simulated;
pub mod store;
pub mod types;

// Re-export for convenience
pub use simulated::{ClockReader, SimulatedClock};
pub use store::{ClockCells, ClockSource, ClockStore, LocalClock};
pub use types::SimTime;
