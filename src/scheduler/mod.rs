/*!
 * Scheduler Module
 * Admission control and the controller loop
 */

pub mod admission;
pub mod config;
pub mod controller;
pub mod pacing;

// Re-export for convenience
pub use admission::{AdmissionPolicy, AdmissionState};
pub use config::{ControllerSettings, SchedulerConfig};
pub use controller::{Controller, ControllerState, RunOutcome, RunSummary, TickReport};
pub use pacing::{FnPacer, NoPacing, TickPacer, YieldPacing};
