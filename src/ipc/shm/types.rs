/*!
 * Shared Memory Types
 * Common types, constants, and errors for the shared clock object
 */

use crate::clock::ClockCells;
use crate::core::errors::OssError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the mapped clock object in bytes
pub const CLOCK_REGION_LEN: usize = std::mem::size_of::<ClockCells>();

/// Shared memory result type
pub type ShmResult<T> = Result<T, ShmError>;

/// Shared memory error types
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ShmError {
    /// Object name is not a valid POSIX shared memory name
    #[error("Invalid shared memory name {0:?}: must start with '/' and contain no other '/'")]
    InvalidName(String),

    /// An object with this name already exists
    #[error("Shared memory {name} already exists; another controller may be using it, or remove the stale object")]
    AlreadyExists { name: String },

    /// shm_open failed
    #[error("Failed to open shared memory {name}: {reason}")]
    OpenFailed { name: String, reason: String },

    /// ftruncate failed
    #[error("Failed to size shared memory {name}: {reason}")]
    ResizeFailed { name: String, reason: String },

    /// mmap failed
    #[error("Failed to map shared memory {name}: {reason}")]
    MapFailed { name: String, reason: String },

    /// munmap or shm_unlink failed
    #[error("Failed to release shared memory {name}: {reason}")]
    ReleaseFailed { name: String, reason: String },
}

impl From<ShmError> for OssError {
    fn from(err: ShmError) -> Self {
        OssError::Resource(err.to_string())
    }
}

/// Access mode for a mapping of the clock object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShmPermission {
    /// Controller: creates, writes and unlinks
    ReadWrite,
    /// Worker: attaches only
    ReadOnly,
}

impl ShmPermission {
    pub fn can_write(&self) -> bool {
        matches!(self, ShmPermission::ReadWrite)
    }
}

/// Check that `name` is a portable POSIX shared memory object name
pub fn validate_name(name: &str) -> ShmResult<()> {
    let valid = name.len() > 1 && name.starts_with('/') && !name[1..].contains('/');
    if valid {
        Ok(())
    } else {
        Err(ShmError::InvalidName(name.to_string()))
    }
}
