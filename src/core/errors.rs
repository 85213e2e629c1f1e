/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for scheduler operations
pub type OssResult<T> = Result<T, OssError>;

/// Every fatal condition the controller and worker can hit.
///
/// A termination for a pid that is not in the process table is deliberately
/// absent: it is expected and handled without surfacing an error.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum OssError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(oss::configuration),
        help("Run `oss -h` to see the accepted flags and their ranges.")
    )]
    Configuration(String),

    #[error("Shared clock unavailable: {0}")]
    #[diagnostic(
        code(oss::resource),
        help("Check that the controller is running and that /dev/shm is writable.")
    )]
    Resource(String),

    #[error("Failed to spawn worker: {0}")]
    #[diagnostic(
        code(oss::spawn),
        help("Verify the worker binary path, or pass `--on-spawn-failure skip` to keep going.")
    )]
    Spawn(String),

    #[error("Process table invariant violated: {0}")]
    #[diagnostic(code(oss::process_table))]
    ProcessTable(String),
}

impl OssError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        1
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, OssError::Configuration(_))
    }
}
