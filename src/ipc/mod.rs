/*!
 * IPC Module
 * Inter-process communication between the controller and its workers
 */

pub mod shm;

pub use shm::{ShmClockOwner, ShmClockView, ShmError};
