/*!
 * Core Types
 * Common types used across the scheduler
 */

/// OS process identifier of a worker (`pid_t`)
pub type WorkerPid = i32;

/// Index into the process table
pub type SlotIndex = usize;
