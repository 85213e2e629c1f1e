/*!
 * Shared Clock Segment
 * POSIX shared memory object holding the simulated clock
 */

use super::types::{validate_name, ShmError, ShmPermission, ShmResult, CLOCK_REGION_LEN};
use crate::clock::{ClockCells, ClockSource, ClockStore, SimTime};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;
use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;
use tracing::{debug, info, warn};

/// A live mapping of the clock object; its owner unmaps it
#[derive(Debug)]
struct Mapping {
    ptr: NonNull<ClockCells>,
}

impl Mapping {
    fn map(name: &str, fd: &OwnedFd, permission: ShmPermission) -> ShmResult<Self> {
        let len = NonZeroUsize::new(CLOCK_REGION_LEN).ok_or_else(|| ShmError::MapFailed {
            name: name.to_string(),
            reason: "zero-length region".to_string(),
        })?;
        let prot = if permission.can_write() {
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE
        } else {
            ProtFlags::PROT_READ
        };

        // SAFETY: a fresh shared mapping of an fd we own, not aliasing any
        // Rust allocation. ClockCells is repr(C) atomics, valid for any bits.
        let ptr = unsafe { mmap(None, len, prot, MapFlags::MAP_SHARED, fd, 0) }.map_err(|e| {
            ShmError::MapFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            ptr: ptr.cast::<ClockCells>(),
        })
    }

    fn cells(&self) -> &ClockCells {
        // SAFETY: the mapping stays valid until Drop; only atomic access is
        // performed through the shared reference.
        unsafe { self.ptr.as_ref() }
    }

    fn unmap(&mut self) -> nix::Result<()> {
        // SAFETY: ptr/len describe exactly the mapping created in `map`, and
        // no reference derived from it outlives `self`.
        unsafe { munmap(self.ptr.cast::<c_void>(), CLOCK_REGION_LEN) }
    }
}

/// Controller side of the shared clock: creates, writes and finally unlinks
/// the object. Dropping without [`ShmClockOwner::release`] still cleans up.
#[derive(Debug)]
pub struct ShmClockOwner {
    name: String,
    mapping: Mapping,
    released: bool,
}

impl ShmClockOwner {
    /// Create a new object, size it, map it read-write and zero it.
    ///
    /// Fails with [`ShmError::AlreadyExists`] if the name is taken; an
    /// existing object is never reused or unlinked.
    pub fn create(name: &str) -> ShmResult<Self> {
        validate_name(name)?;

        let fd = shm_open(
            name,
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )
        .map_err(|e| match e {
            Errno::EEXIST => ShmError::AlreadyExists {
                name: name.to_string(),
            },
            e => ShmError::OpenFailed {
                name: name.to_string(),
                reason: e.to_string(),
            },
        })?;

        let sized = ftruncate(&fd, CLOCK_REGION_LEN as nix::libc::off_t).map_err(|e| ShmError::ResizeFailed {
            name: name.to_string(),
            reason: e.to_string(),
        });
        if let Err(err) = sized {
            let _ = shm_unlink(name);
            return Err(err);
        }

        let mapping = match Mapping::map(name, &fd, ShmPermission::ReadWrite) {
            Ok(mapping) => mapping,
            Err(err) => {
                let _ = shm_unlink(name);
                return Err(err);
            }
        };
        mapping.cells().store(SimTime::ZERO);

        info!(name = %name, bytes = CLOCK_REGION_LEN, "Shared clock created");
        Ok(Self {
            name: name.to_string(),
            mapping,
            released: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unmap and unlink the object
    pub fn release(mut self) -> ShmResult<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> ShmResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let unmapped = self.mapping.unmap();
        let unlinked = shm_unlink(self.name.as_str());
        match unmapped.and(unlinked) {
            Ok(()) => {
                info!(name = %self.name, "Shared clock released");
                Ok(())
            }
            Err(e) => Err(ShmError::ReleaseFailed {
                name: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

impl ClockSource for ShmClockOwner {
    fn load(&self) -> SimTime {
        self.mapping.cells().load()
    }
}

impl ClockStore for ShmClockOwner {
    fn store(&self, time: SimTime) {
        self.mapping.cells().store(time)
    }
}

impl Drop for ShmClockOwner {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            warn!(error = %e, "Shared clock cleanup on drop failed");
        }
    }
}

/// Worker side of the shared clock: attach-only, mapped read-only
#[derive(Debug)]
pub struct ShmClockView {
    name: String,
    mapping: Mapping,
}

impl ShmClockView {
    /// Open an existing object; never creates one
    pub fn attach(name: &str) -> ShmResult<Self> {
        validate_name(name)?;

        let fd = shm_open(name, OFlag::O_RDONLY, Mode::empty()).map_err(|e| {
            ShmError::OpenFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        let mapping = Mapping::map(name, &fd, ShmPermission::ReadOnly)?;

        debug!(name = %name, "Attached to shared clock");
        Ok(Self {
            name: name.to_string(),
            mapping,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ClockSource for ShmClockView {
    fn load(&self) -> SimTime {
        self.mapping.cells().load()
    }
}

impl Drop for ShmClockView {
    fn drop(&mut self) {
        if let Err(e) = self.mapping.unmap() {
            warn!(name = %self.name, error = %e, "Failed to unmap shared clock");
        }
    }
}
