/*!
 * Process Module
 * Worker launching, reaping and the process table
 */

pub mod executor;
pub mod reaper;
pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use executor::{ExecutionConfig, ProcessLauncher};
pub use reaper::WaitReaper;
pub use table::{ProcessControlBlock, ProcessTable, TableSnapshot};
pub use traits::{Launcher, Reaper};
pub use types::{SpawnFailurePolicy, WorkBudget};
