//! # Machine Registry
//!
//! In-memory machine table with a serial-number index. Registration and
//! serial changes check and claim the serial under one write lock, so two
//! concurrent registrations of the same serial cannot both succeed. The
//! database `UNIQUE (serial_number)` constraint is the second line when
//! persistence is enabled.

use std::collections::HashMap;
use std::sync::Arc;

use acm_core::{AcmError, ArcadeId, MachineId, SerialNumber};
use parking_lot::RwLock;

use crate::state::MachineRecord;

#[derive(Debug, Default)]
struct MachineTable {
    by_id: HashMap<MachineId, MachineRecord>,
    serials: HashMap<SerialNumber, MachineId>,
}

impl MachineTable {
    fn serial_taken_by_other(&self, serial: &SerialNumber, id: MachineId) -> bool {
        self.serials.get(serial).is_some_and(|owner| *owner != id)
    }

    /// Write `record`, moving its serial index entry if the serial changed.
    fn put(&mut self, record: MachineRecord) -> Option<MachineRecord> {
        let previous = self.by_id.insert(record.id, record.clone());
        if let Some(prev) = &previous {
            if prev.serial_number != record.serial_number {
                self.serials.remove(&prev.serial_number);
            }
        }
        self.serials.insert(record.serial_number, record.id);
        previous
    }
}

/// Result of an in-place machine update.
#[derive(Debug, Clone)]
pub struct MachineUpdate {
    pub previous: MachineRecord,
    pub current: MachineRecord,
}

/// Shared, cloneable machine registry.
#[derive(Debug, Clone, Default)]
pub struct MachineRegistry {
    table: Arc<RwLock<MachineTable>>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new machine.
    ///
    /// # Errors
    ///
    /// [`AcmError::DuplicateSerial`] if any machine already holds the serial.
    pub fn register(&self, record: MachineRecord) -> Result<MachineRecord, AcmError> {
        let mut table = self.table.write();
        if table.serials.contains_key(&record.serial_number) {
            return Err(AcmError::DuplicateSerial(record.serial_number.to_string()));
        }
        table.put(record.clone());
        Ok(record)
    }

    pub fn get(&self, id: MachineId) -> Option<MachineRecord> {
        self.table.read().by_id.get(&id).cloned()
    }

    /// All machines of an arcade, active or not, newest first.
    pub fn for_arcade(&self, arcade: ArcadeId) -> Vec<MachineRecord> {
        let mut machines: Vec<MachineRecord> = self
            .table
            .read()
            .by_id
            .values()
            .filter(|m| m.arcade_id == arcade)
            .cloned()
            .collect();
        machines.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        machines
    }

    /// Apply `f` to a copy of the machine and commit it if the serial
    /// number is still unique.
    ///
    /// Returns `None` when the machine does not exist.
    pub fn update(
        &self,
        id: MachineId,
        f: impl FnOnce(&mut MachineRecord),
    ) -> Option<Result<MachineUpdate, AcmError>> {
        let mut table = self.table.write();
        let previous = table.by_id.get(&id)?.clone();
        let mut current = previous.clone();
        f(&mut current);
        current.id = id;

        if table.serial_taken_by_other(&current.serial_number, id) {
            return Some(Err(AcmError::DuplicateSerial(
                current.serial_number.to_string(),
            )));
        }
        table.put(current.clone());
        Some(Ok(MachineUpdate { previous, current }))
    }

    /// Put back a previous version of a machine. Used to undo an update or
    /// removal whose write-through failed.
    ///
    /// # Errors
    ///
    /// [`AcmError::DuplicateSerial`] if another machine claimed the serial
    /// in the meantime. The registry is left unchanged.
    pub fn restore(&self, record: MachineRecord) -> Result<(), AcmError> {
        let mut table = self.table.write();
        if table.serial_taken_by_other(&record.serial_number, record.id) {
            return Err(AcmError::DuplicateSerial(record.serial_number.to_string()));
        }
        table.put(record);
        Ok(())
    }

    pub fn remove(&self, id: MachineId) -> Option<MachineRecord> {
        let mut table = self.table.write();
        let removed = table.by_id.remove(&id)?;
        table.serials.remove(&removed.serial_number);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.table.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::machine;
    use acm_core::MachineCategory;
    use chrono::Duration;

    fn holders(registry: &MachineRegistry, serial: &str) -> usize {
        registry
            .table
            .read()
            .by_id
            .values()
            .filter(|m| m.serial_number.as_str() == serial)
            .count()
    }

    fn indexed(registry: &MachineRegistry, serial: &str) -> bool {
        registry
            .table
            .read()
            .serials
            .contains_key(&SerialNumber::new(serial).unwrap())
    }

    #[test]
    fn duplicate_serial_rejected_across_arcades() {
        let registry = MachineRegistry::new();
        registry
            .register(machine(ArcadeId::new(), "SN-1", MachineCategory::C))
            .unwrap();
        let err = registry
            .register(machine(ArcadeId::new(), "SN-1", MachineCategory::D))
            .unwrap_err();
        assert_eq!(err.to_string(), "Machine with serial number SN-1 already exists");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_registration_admits_one() {
        let registry = MachineRegistry::new();
        let arcade = ArcadeId::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .register(machine(arcade, "RACE-1", MachineCategory::C))
                        .is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn for_arcade_is_newest_first() {
        let registry = MachineRegistry::new();
        let arcade = ArcadeId::new();
        let mut older = machine(arcade, "OLD", MachineCategory::C);
        older.created_at -= Duration::hours(1);
        registry.register(older).unwrap();
        registry
            .register(machine(arcade, "NEW", MachineCategory::C))
            .unwrap();
        registry
            .register(machine(ArcadeId::new(), "ELSEWHERE", MachineCategory::C))
            .unwrap();

        let serials: Vec<String> = registry
            .for_arcade(arcade)
            .into_iter()
            .map(|m| m.serial_number.to_string())
            .collect();
        assert_eq!(serials, vec!["NEW", "OLD"]);
    }

    #[test]
    fn serial_change_is_uniqueness_guarded() {
        let registry = MachineRegistry::new();
        let arcade = ArcadeId::new();
        registry.register(machine(arcade, "A", MachineCategory::C)).unwrap();
        let b = registry.register(machine(arcade, "B", MachineCategory::C)).unwrap();

        let taken = SerialNumber::new("A").unwrap();
        let result = registry
            .update(b.id, |m| m.serial_number = taken.clone())
            .unwrap();
        assert!(matches!(result, Err(AcmError::DuplicateSerial(_))));
        assert_eq!(registry.get(b.id).unwrap().serial_number.as_str(), "B");

        let fresh = SerialNumber::new("C").unwrap();
        let update = registry
            .update(b.id, |m| m.serial_number = fresh.clone())
            .unwrap()
            .unwrap();
        assert_eq!(update.previous.serial_number.as_str(), "B");
        assert!(!indexed(&registry, "B"));
        assert!(indexed(&registry, "C"));
    }

    #[test]
    fn update_keeping_own_serial_is_allowed() {
        let registry = MachineRegistry::new();
        let m = registry
            .register(machine(ArcadeId::new(), "SELF", MachineCategory::C))
            .unwrap();
        let update = registry
            .update(m.id, |m| m.is_active = false)
            .unwrap()
            .unwrap();
        assert!(!update.current.is_active);
    }

    #[test]
    fn restore_undoes_update() {
        let registry = MachineRegistry::new();
        let m = registry
            .register(machine(ArcadeId::new(), "X", MachineCategory::B3))
            .unwrap();
        let update = registry
            .update(m.id, |m| {
                m.serial_number = SerialNumber::new("Y").unwrap();
                m.category = MachineCategory::C;
            })
            .unwrap()
            .unwrap();
        registry.restore(update.previous).unwrap();
        let back = registry.get(m.id).unwrap();
        assert_eq!(back.serial_number.as_str(), "X");
        assert_eq!(back.category, MachineCategory::B3);
        assert!(!indexed(&registry, "Y"));
    }

    #[test]
    fn restore_refuses_serial_claimed_after_update() {
        let registry = MachineRegistry::new();
        let arcade = ArcadeId::new();
        let first = registry
            .register(machine(arcade, "X", MachineCategory::C))
            .unwrap();
        let update = registry
            .update(first.id, |m| m.serial_number = SerialNumber::new("Y").unwrap())
            .unwrap()
            .unwrap();
        let second = registry
            .register(machine(arcade, "X", MachineCategory::D))
            .unwrap();

        let err = registry.restore(update.previous).unwrap_err();
        assert!(matches!(err, AcmError::DuplicateSerial(s) if s == "X"));
        assert_eq!(holders(&registry, "X"), 1);
        assert_eq!(registry.get(first.id).unwrap().serial_number.as_str(), "Y");

        registry.remove(first.id).unwrap();
        assert!(registry
            .register(machine(arcade, "X", MachineCategory::C))
            .is_err());
        assert!(registry.get(second.id).is_some());
    }

    #[test]
    fn restore_refuses_serial_claimed_after_remove() {
        let registry = MachineRegistry::new();
        let arcade = ArcadeId::new();
        let first = registry
            .register(machine(arcade, "X", MachineCategory::C))
            .unwrap();
        let removed = registry.remove(first.id).unwrap();
        registry
            .register(machine(arcade, "X", MachineCategory::D))
            .unwrap();

        assert!(registry.restore(removed).is_err());
        assert_eq!(holders(&registry, "X"), 1);
        assert!(registry.get(first.id).is_none());
    }

    #[test]
    fn remove_frees_serial() {
        let registry = MachineRegistry::new();
        let m = registry
            .register(machine(ArcadeId::new(), "GONE", MachineCategory::D))
            .unwrap();
        assert!(registry.remove(m.id).is_some());
        assert!(registry.remove(m.id).is_none());
        assert!(registry
            .register(machine(ArcadeId::new(), "GONE", MachineCategory::D))
            .is_ok());
    }

    #[test]
    fn update_missing_machine_is_none() {
        let registry = MachineRegistry::new();
        assert!(registry.update(MachineId::new(), |_| {}).is_none());
    }
}
