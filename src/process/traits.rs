/*!
 * Process Traits
 * Seams between the controller loop and the operating system
 */

use super::types::WorkBudget;
use crate::core::errors::OssResult;
use crate::core::types::WorkerPid;

/// Starts workers
pub trait Launcher {
    /// Spawn one worker with the given budget and return its pid.
    /// Fails with [`OssError::Spawn`](crate::OssError::Spawn).
    fn launch(&mut self, budget: WorkBudget) -> OssResult<WorkerPid>;
}

/// Detects terminated workers without blocking
pub trait Reaper {
    /// At most one terminated child per call, `None` when nothing exited
    fn poll_terminated(&mut self) -> Option<WorkerPid>;
}

impl<L: Launcher + ?Sized> Launcher for Box<L> {
    fn launch(&mut self, budget: WorkBudget) -> OssResult<WorkerPid> {
        (**self).launch(budget)
    }
}

impl<R: Reaper + ?Sized> Reaper for Box<R> {
    fn poll_terminated(&mut self) -> Option<WorkerPid> {
        (**self).poll_terminated()
    }
}
