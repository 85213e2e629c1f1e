/*!
 * Cancellation
 * Interrupt and watchdog handling for the controller loop
 *
 * Signal handlers only set an atomic flag. The loop polls a
 * [`CancellationToken`] once per tick and performs teardown itself.
 */

use crate::core::errors::{OssError, OssResult};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

static SIGNAL_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn record_signal(_signal: nix::libc::c_int) {
    // Async-signal-safe: a single atomic store
    SIGNAL_RECEIVED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the process-wide cancellation flag
pub fn install_signal_handlers() -> OssResult<()> {
    let action = SigAction::new(
        SigHandler::Handler(record_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only touches an atomic
        unsafe { sigaction(signal, &action) }.map_err(|e| {
            OssError::Resource(format!("failed to install {} handler: {}", signal, e))
        })?;
    }

    debug!("Signal handlers installed for SIGINT and SIGTERM");
    Ok(())
}

/// Whether SIGINT or SIGTERM has arrived since the handlers were installed
pub fn signal_received() -> bool {
    SIGNAL_RECEIVED.load(Ordering::SeqCst)
}

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// SIGINT or SIGTERM
    Interrupted,
    /// The wall-clock watchdog expired
    WatchdogExpired,
    /// Cancelled programmatically
    Requested,
}

impl CancelReason {
    fn to_u8(self) -> u8 {
        match self {
            CancelReason::Interrupted => 1,
            CancelReason::WatchdogExpired => 2,
            CancelReason::Requested => 3,
        }
    }

    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CancelReason::Interrupted),
            2 => Some(CancelReason::WatchdogExpired),
            3 => Some(CancelReason::Requested),
            _ => None,
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Interrupted => write!(f, "interrupted"),
            CancelReason::WatchdogExpired => write!(f, "watchdog expired"),
            CancelReason::Requested => write!(f, "cancel requested"),
        }
    }
}

/// Wall-clock deadline for a run
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    /// `None` when the limit is too large to represent
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn start(limit: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(limit),
        }
    }

    pub fn expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Shared cancellation state.
///
/// Clones share the recorded reason. The first reason recorded wins.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    reason: Arc<AtomicU8>,
    watchdog: Option<Watchdog>,
    observe_signals: bool,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a watchdog that expires `limit` from now
    pub fn with_watchdog(mut self, limit: Duration) -> Self {
        self.watchdog = Some(Watchdog::start(limit));
        self
    }

    /// Also treat a received SIGINT/SIGTERM as cancellation
    pub fn observing_signals(mut self) -> Self {
        self.observe_signals = true;
        self
    }

    pub fn cancel(&self, reason: CancelReason) {
        if self
            .reason
            .compare_exchange(0, reason.to_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!(%reason, "Cancellation requested");
        }
    }

    /// The cancellation reason, checking signals and the watchdog first
    pub fn cancelled(&self) -> Option<CancelReason> {
        if self.observe_signals && signal_received() {
            self.cancel(CancelReason::Interrupted);
        }
        if self.watchdog.map_or(false, |w| w.expired()) {
            self.cancel(CancelReason::WatchdogExpired);
        }
        CancelReason::from_u8(self.reason.load(Ordering::SeqCst))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled().is_some()
    }
}
