/*!
 * Process Executor
 * Spawns worker processes at the OS level
 */

use super::traits::Launcher;
use super::types::WorkBudget;
use crate::core::errors::{OssError, OssResult};
use crate::core::limits::{CLOCK_SHM_ENV, WORKER_BINARY_NAME};
use crate::core::types::WorkerPid;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Configuration for worker execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Worker executable
    pub program: PathBuf,
    /// Shared clock object the worker attaches to
    pub shm_name: String,
}

impl ExecutionConfig {
    pub fn new(program: impl Into<PathBuf>, shm_name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            shm_name: shm_name.into(),
        }
    }

    /// The `worker` executable installed next to the running binary
    pub fn beside_current_exe(shm_name: impl Into<String>) -> OssResult<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| OssError::Spawn(format!("cannot locate current executable: {}", e)))?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(WORKER_BINARY_NAME), shm_name))
    }
}

/// Launches workers as child processes.
///
/// Children are not waited on here; [`WaitReaper`](super::WaitReaper)
/// collects them, so the `Child` handle is dropped right after spawning.
#[derive(Debug)]
pub struct ProcessLauncher {
    config: ExecutionConfig,
    spawned: u64,
}

impl ProcessLauncher {
    pub fn new(config: ExecutionConfig) -> Self {
        info!(program = %config.program.display(), shm = %config.shm_name, "Process launcher initialized");
        Self { config, spawned: 0 }
    }

    /// Number of successful spawns
    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, budget: WorkBudget) -> OssResult<WorkerPid> {
        let child = Command::new(&self.config.program)
            .args(budget.to_args())
            .env(CLOCK_SHM_ENV, &self.config.shm_name)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| OssError::Spawn(format!("{}: {}", self.config.program.display(), e)))?;

        let pid = WorkerPid::try_from(child.id())
            .map_err(|_| OssError::Spawn(format!("pid {} out of range", child.id())))?;
        self.spawned += 1;

        debug!(pid, budget = %budget, "Spawned worker process");
        Ok(pid)
    }
}
