/*!
 * Process Table
 * Fixed-capacity registry of live workers
 */

use crate::clock::SimTime;
use crate::core::errors::{OssError, OssResult};
use crate::core::types::{SlotIndex, WorkerPid};
use serde::{Deserialize, Serialize};

/// One table entry describing a live worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessControlBlock {
    pub occupied: bool,
    pub pid: WorkerPid,
    pub start: SimTime,
}

/// Fixed-size table of PCBs.
///
/// A worker keeps the same slot from launch until it is reaped, and a pid is
/// held by at most one occupied slot.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    slots: Box<[ProcessControlBlock]>,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![ProcessControlBlock::default(); capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// First unoccupied slot, if any
    pub fn find_free_slot(&self) -> Option<SlotIndex> {
        self.slots.iter().position(|pcb| !pcb.occupied)
    }

    /// Register `pid` in `slot`.
    ///
    /// Refuses an out-of-range slot, an occupied slot or a pid that is
    /// already tracked rather than overwriting live state.
    pub fn occupy(&mut self, slot: SlotIndex, pid: WorkerPid, start: SimTime) -> OssResult<()> {
        if self.slot_of(pid).is_some() {
            return Err(OssError::ProcessTable(format!(
                "pid {} is already registered",
                pid
            )));
        }
        let capacity = self.capacity();
        let pcb = self.slots.get_mut(slot).ok_or_else(|| {
            OssError::ProcessTable(format!("slot {} out of range (capacity {})", slot, capacity))
        })?;
        if pcb.occupied {
            return Err(OssError::ProcessTable(format!(
                "slot {} already holds pid {}",
                slot, pcb.pid
            )));
        }

        *pcb = ProcessControlBlock {
            occupied: true,
            pid,
            start,
        };
        Ok(())
    }

    /// Free the slot holding `pid`. Returns the slot, or `None` when the pid
    /// is not tracked (a no-op).
    pub fn release(&mut self, pid: WorkerPid) -> Option<SlotIndex> {
        let slot = self.slot_of(pid)?;
        self.slots[slot].occupied = false;
        Some(slot)
    }

    pub fn slot_of(&self, pid: WorkerPid) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|pcb| pcb.occupied && pcb.pid == pid)
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&ProcessControlBlock> {
        self.slots.get(slot)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|pcb| pcb.occupied).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessControlBlock> {
        self.slots.iter()
    }

    /// Immutable copy for reporting
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            entries: self.slots.to_vec(),
        }
    }
}

/// Point-in-time copy of the process table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TableSnapshot {
    pub entries: Vec<ProcessControlBlock>,
}

impl TableSnapshot {
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, &ProcessControlBlock)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, pcb)| pcb.occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_slot_is_first_unoccupied() {
        let mut table = ProcessTable::new(3);
        assert_eq!(table.find_free_slot(), Some(0));

        table.occupy(0, 100, SimTime::ZERO).unwrap();
        table.occupy(1, 101, SimTime::ZERO).unwrap();
        assert_eq!(table.find_free_slot(), Some(2));

        table.release(100);
        assert_eq!(table.find_free_slot(), Some(0));
    }

    #[test]
    fn test_full_table_has_no_free_slot() {
        let mut table = ProcessTable::new(1);
        table.occupy(0, 7, SimTime::ZERO).unwrap();
        assert_eq!(table.find_free_slot(), None);
    }

    #[test]
    fn test_occupy_refuses_overwrite() {
        let mut table = ProcessTable::new(2);
        table.occupy(0, 7, SimTime::ZERO).unwrap();
        assert!(table.occupy(0, 8, SimTime::ZERO).is_err());
        assert!(table.occupy(1, 7, SimTime::ZERO).is_err());
        assert!(table.occupy(5, 9, SimTime::ZERO).is_err());
        assert_eq!(table.get(0).map(|pcb| pcb.pid), Some(7));
    }

    #[test]
    fn test_release_unknown_pid_is_noop() {
        let mut table = ProcessTable::new(2);
        table.occupy(1, 42, SimTime::new(1, 5)).unwrap();

        assert_eq!(table.release(999), None);
        assert_eq!(table.occupied_count(), 1);
        assert_eq!(table.release(42), Some(1));
        assert_eq!(table.release(42), None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut table = ProcessTable::new(2);
        table.occupy(0, 1, SimTime::new(0, 10)).unwrap();
        let snapshot = table.snapshot();

        table.release(1);
        assert_eq!(snapshot.occupied_count(), 1);
        assert_eq!(table.occupied_count(), 0);
    }
}
