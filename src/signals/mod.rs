/*!
 * Signals Module
 * Cancellation tokens, OS signal handlers and teardown
 */

pub mod cancellation;
pub mod teardown;

pub use cancellation::{
    install_signal_handlers, signal_received, CancelReason, CancellationToken, Watchdog,
};
pub use teardown::{become_group_leader, teardown};
