/*!
 * Process Reaper
 * Non-blocking collection of terminated children
 */

use super::traits::Reaper;
use crate::core::types::WorkerPid;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid as NixPid;
use tracing::{debug, warn};

/// Reaps any child of this process with `waitpid(-1, WNOHANG)`
#[derive(Debug, Default)]
pub struct WaitReaper {
    reaped: u64,
}

impl WaitReaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children collected so far
    pub fn reaped(&self) -> u64 {
        self.reaped
    }
}

impl Reaper for WaitReaper {
    fn poll_terminated(&mut self) -> Option<WorkerPid> {
        match waitpid(NixPid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!(pid = pid.as_raw(), code, "Child exited");
                self.reaped += 1;
                Some(pid.as_raw())
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                debug!(pid = pid.as_raw(), signal = ?signal, "Child killed by signal");
                self.reaped += 1;
                Some(pid.as_raw())
            }
            // StillAlive, or a stop/continue notification
            Ok(_) => None,
            Err(Errno::ECHILD) => None,
            Err(e) => {
                warn!(error = %e, "waitpid failed");
                None
            }
        }
    }
}
