/*!
 * Teardown
 * The single cleanup path for every controller exit
 */

use crate::core::errors::{OssError, OssResult};
use crate::ipc::ShmClockOwner;
use nix::sys::signal::{kill, signal, SigHandler, Signal};
use nix::unistd::{getpgrp, getpid, setpgid, Pid as NixPid};
use tracing::{debug, info, warn};

/// Make the controller the leader of its own process group.
///
/// Must run before any worker is spawned: workers inherit the group, and
/// teardown signals exactly that group, so whatever launched the controller
/// stays outside it. A session leader cannot move but already leads its
/// group.
pub fn become_group_leader() -> OssResult<()> {
    let me = getpid();
    if let Err(e) = setpgid(NixPid::from_raw(0), NixPid::from_raw(0)) {
        if getpgrp() != me {
            return Err(OssError::Resource(format!(
                "failed to create worker process group: {}",
                e
            )));
        }
    }
    debug!(pgid = %getpgrp(), "Controller leads its process group");
    Ok(())
}

/// Release the shared clock, then optionally SIGTERM the process group.
///
/// The group is the one set up by [`become_group_leader`]. The controller
/// ignores SIGTERM first so the group-wide signal only reaches the workers. Both steps are attempted even if the first fails;
/// the first error is returned.
pub fn teardown(region: Option<ShmClockOwner>, terminate_group: bool) -> OssResult<()> {
    let mut first_error: Option<OssError> = None;

    if let Some(region) = region {
        let name = region.name().to_string();
        if let Err(e) = region.release() {
            warn!(shm = %name, error = %e, "Failed to release shared clock");
            first_error.get_or_insert(e.into());
        }
    }

    if terminate_group {
        if let Err(e) = terminate_process_group() {
            warn!(error = %e, "Failed to terminate worker process group");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn terminate_process_group() -> OssResult<()> {
    // SAFETY: installs SIG_IGN, no handler code runs
    unsafe { signal(Signal::SIGTERM, SigHandler::SigIgn) }
        .map_err(|e| OssError::Resource(format!("failed to ignore SIGTERM: {}", e)))?;

    kill(NixPid::from_raw(0), Signal::SIGTERM)
        .map_err(|e| OssError::Resource(format!("failed to signal process group: {}", e)))?;

    info!("Sent SIGTERM to worker process group");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_do() {
        assert!(teardown(None, false).is_ok());
    }
}
