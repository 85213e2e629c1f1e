/*!
 * OSS Scheduler Library
 * Simulated-clock process scheduler shared by the `oss` and `worker` binaries
 */

pub mod cli;
pub mod clock;
pub mod core;
pub mod ipc;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod signals;
pub mod worker;

// Re-exports
pub use clock::{ClockReader, ClockSource, ClockStore, LocalClock, SimTime, SimulatedClock};
pub use self::core::errors::{OssError, OssResult};
pub use self::core::types::{SlotIndex, WorkerPid};
pub use ipc::{ShmClockOwner, ShmClockView};
pub use monitoring::{init_tracing, ControllerEvent, Reporter, ReportFormat, TableReporter};
pub use process::{
    ExecutionConfig, Launcher, ProcessLauncher, ProcessTable, Reaper, SpawnFailurePolicy,
    WaitReaper, WorkBudget,
};
pub use scheduler::{
    Controller, ControllerSettings, ControllerState, RunOutcome, RunSummary, SchedulerConfig,
};
pub use signals::{CancelReason, CancellationToken};
pub use worker::{Worker, WorkerEvent, WorkerMessage};
