/*!
 * Command Line
 * Argument parsing for the `oss` controller and `worker` binaries
 */

use crate::core::errors::{OssError, OssResult};
use crate::core::limits::{CLOCK_SHM_ENV, DEFAULT_SHM_NAME, DEFAULT_WATCHDOG, WORKER_PATH_ENV};
use crate::ipc::shm::validate_name;
use crate::monitoring::ReportFormat;
use crate::process::{ExecutionConfig, SpawnFailurePolicy, WorkBudget};
use crate::scheduler::{ControllerSettings, SchedulerConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Controller arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "oss")]
#[command(about = "Launch workers against a simulated clock under admission control", long_about = None)]
pub struct Cli {
    /// Total number of workers to launch
    #[arg(short = 'n', value_name = "PROC")]
    pub total_workers: u32,

    /// Maximum number of workers running at once
    #[arg(short = 's', value_name = "SIMUL")]
    pub max_concurrent: u32,

    /// Simulated seconds each worker runs
    #[arg(short = 't', value_name = "TIME_LIMIT", allow_negative_numbers = true)]
    pub worker_duration: f64,

    /// Minimum simulated seconds between launches
    #[arg(short = 'i', value_name = "LAUNCH_INTERVAL", allow_negative_numbers = true)]
    pub launch_interval: f64,

    /// Wall-clock seconds before the run is cancelled
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_WATCHDOG.as_secs())]
    pub watchdog: u64,

    /// What to do when a worker fails to spawn
    #[arg(long, value_enum, default_value_t = SpawnFailurePolicy::Abort)]
    pub on_spawn_failure: SpawnFailurePolicy,

    /// Worker executable (default: `worker` next to this binary)
    #[arg(long, env = WORKER_PATH_ENV)]
    pub worker_path: Option<PathBuf>,

    /// How table reports are printed
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub report_format: ReportFormat,

    /// Name of the shared memory object holding the clock
    #[arg(long, env = CLOCK_SHM_ENV, default_value = DEFAULT_SHM_NAME)]
    pub shm_name: String,
}

impl Cli {
    /// Validate everything and split into admission limits and tunables
    pub fn into_config(&self) -> OssResult<(SchedulerConfig, ControllerSettings)> {
        let config = SchedulerConfig::new(
            self.total_workers,
            self.max_concurrent,
            self.worker_duration,
            self.launch_interval,
        );
        let settings = ControllerSettings::default()
            .with_watchdog(Duration::from_secs(self.watchdog))
            .with_spawn_failure(self.on_spawn_failure);

        config.validate(&settings)?;
        validate_name(&self.shm_name).map_err(|e| OssError::Configuration(e.to_string()))?;
        Ok((config, settings))
    }

    /// Where workers are spawned from and which clock they attach to
    pub fn execution_config(&self) -> OssResult<ExecutionConfig> {
        match &self.worker_path {
            Some(path) => Ok(ExecutionConfig::new(path.clone(), self.shm_name.clone())),
            None => ExecutionConfig::beside_current_exe(self.shm_name.clone()),
        }
    }
}

/// Worker arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "worker")]
#[command(about = "Run until the simulated clock passes a work budget", long_about = None)]
pub struct WorkerCli {
    /// Whole seconds of the work budget
    pub seconds: u32,

    /// Nanoseconds of the work budget
    pub nanos: u32,

    /// Shared memory object holding the clock
    #[arg(long, env = CLOCK_SHM_ENV, default_value = DEFAULT_SHM_NAME)]
    pub shm_name: String,
}

impl WorkerCli {
    pub fn budget(&self) -> WorkBudget {
        WorkBudget::new(self.seconds, self.nanos)
    }
}

/// Exit status for a clap parse failure: help and version are not errors
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
