/*!
 * Simulated Clock
 * Controller-owned writer and worker-side read-only handle
 */

use super::store::{ClockSource, ClockStore};
use super::types::SimTime;

/// The controller's clock. Sole writer of the underlying storage.
///
/// The current value is cached locally so the controller never has to read
/// back from shared memory.
///
/// # Example
/// ```
/// use oss_scheduler::{LocalClock, SimTime, SimulatedClock};
///
/// let mut clock = SimulatedClock::new(LocalClock::new());
/// clock.advance(600_000_000);
/// clock.advance(600_000_000);
/// assert_eq!(clock.now(), SimTime::new(1, 200_000_000));
/// ```
#[derive(Debug)]
pub struct SimulatedClock<S: ClockStore> {
    store: S,
    now: SimTime,
}

impl<S: ClockStore> SimulatedClock<S> {
    /// Wrap storage and reset it to zero
    pub fn new(store: S) -> Self {
        store.store(SimTime::ZERO);
        Self {
            store,
            now: SimTime::ZERO,
        }
    }

    /// Advance by `amount_ns`, carrying into seconds. Never moves backwards.
    pub fn advance(&mut self, amount_ns: u64) -> SimTime {
        self.now = self.now.saturating_add_nanos(amount_ns);
        self.store.store(self.now);
        self.now
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the storage back, e.g. to release a shared memory object
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Read-only view of the clock handed to workers
#[derive(Debug, Clone)]
pub struct ClockReader<C: ClockSource> {
    source: C,
}

impl<C: ClockSource> ClockReader<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }

    pub fn now(&self) -> SimTime {
        self.source.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::LocalClock;

    #[test]
    fn test_new_resets_storage() {
        let storage = LocalClock::new();
        storage.store(SimTime::new(9, 9));
        let clock = SimulatedClock::new(storage.clone());
        assert_eq!(clock.now(), SimTime::ZERO);
        assert_eq!(storage.load(), SimTime::ZERO);
    }

    #[test]
    fn test_reader_sees_advances() {
        let storage = LocalClock::new();
        let mut clock = SimulatedClock::new(storage.clone());
        let reader = ClockReader::new(storage);

        clock.advance(999_995_000);
        clock.advance(10_000);
        assert_eq!(reader.now(), SimTime::new(1, 5_000));
    }
}
