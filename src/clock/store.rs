/*!
 * Clock Storage
 *
 * The simulated clock is two `u32` fields, seconds then nanoseconds, packed
 * into one 64-bit atomic word so that another process always reads both
 * fields from the same store. The same layout is used in-process
 * (`LocalClock`) and inside the shared memory object.
 */

use super::types::SimTime;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Raw clock layout: exactly two integers, seconds then nanoseconds.
///
/// Both fields share one atomic word, so a reader sees either the instant
/// before an advance or the one after it, including across a carry into the
/// seconds field.
#[repr(C)]
#[derive(Debug, Default)]
pub struct ClockCells {
    word: AtomicU64,
}

impl ClockCells {
    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
        }
    }

    pub fn load(&self) -> SimTime {
        let (seconds, nanos) = unpack(self.word.load(Ordering::Acquire));
        SimTime::new(seconds, nanos)
    }

    pub fn store(&self, time: SimTime) {
        self.word
            .store(pack(time.seconds(), time.nanos()), Ordering::Release);
    }
}

// Native byte order keeps seconds in the first four bytes of the object
fn pack(seconds: u32, nanos: u32) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&seconds.to_ne_bytes());
    bytes[4..].copy_from_slice(&nanos.to_ne_bytes());
    u64::from_ne_bytes(bytes)
}

fn unpack(word: u64) -> (u32, u32) {
    let bytes = word.to_ne_bytes();
    let [s0, s1, s2, s3, n0, n1, n2, n3] = bytes;
    (
        u32::from_ne_bytes([s0, s1, s2, s3]),
        u32::from_ne_bytes([n0, n1, n2, n3]),
    )
}

/// Read access to a clock
pub trait ClockSource {
    fn load(&self) -> SimTime;
}

/// Read-write access to a clock; only the controller holds one
pub trait ClockStore: ClockSource {
    fn store(&self, time: SimTime);
}

/// In-process clock storage.
///
/// Clones share the same cells, so a clone handed to a [`ClockReader`]
/// observes every advance made through the original.
///
/// [`ClockReader`]: super::ClockReader
#[derive(Debug, Clone, Default)]
pub struct LocalClock {
    cells: Arc<ClockCells>,
}

impl LocalClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockSource for LocalClock {
    fn load(&self) -> SimTime {
        self.cells.load()
    }
}

impl ClockStore for LocalClock {
    fn store(&self, time: SimTime) {
        self.cells.store(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_two_u32() {
        assert_eq!(std::mem::size_of::<ClockCells>(), 8);

        let cells = ClockCells::new();
        cells.store(SimTime::new(3, 7));
        // SAFETY: ClockCells is 8 initialized bytes
        let raw: [u32; 2] = unsafe { std::mem::transmute_copy(&cells) };
        assert_eq!(raw, [3, 7]);
    }

    #[test]
    fn test_reader_never_sees_time_go_backwards() {
        let clock = LocalClock::new();
        let writer = clock.clone();
        // Start just before a carry so every few steps roll the seconds over
        clock.store(SimTime::new(5, 999_990_000));

        let handle = std::thread::spawn(move || {
            let mut now = writer.load();
            for _ in 0..200_000 {
                now = now.saturating_add_nanos(10_000);
                writer.store(now);
            }
            now
        });

        let mut last = clock.load();
        while !handle.is_finished() {
            let seen = clock.load();
            assert!(seen >= last, "clock went from {} to {}", last, seen);
            last = seen;
        }
        let end = handle.join().unwrap();
        assert_eq!(clock.load(), end);
        assert_eq!(end, SimTime::new(7, 999_990_000));
    }

    #[test]
    fn test_clones_share_cells() {
        let clock = LocalClock::new();
        let observer = clock.clone();
        clock.store(SimTime::new(4, 20));
        assert_eq!(observer.load(), SimTime::new(4, 20));
    }
}
