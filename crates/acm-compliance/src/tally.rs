//! # Machine Tally
//!
//! Counts of active machines per category. The tally is the only input the
//! quota rule needs, so the same evaluation can score a live machine set
//! or the declared machine counts captured when an arcade is set up.

use acm_core::MachineCategory;
use serde::{Deserialize, Serialize};

use crate::machine::MachineView;

/// Active machine counts for one arcade.
///
/// Invariant: `total == b3 + c + d + other`. The fields are private so the
/// invariant holds by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineTally {
    total: usize,
    b3: usize,
    c: usize,
    d: usize,
    other: usize,
}

impl MachineTally {
    /// Tally the active machines in `machines`. Inactive machines are
    /// skipped entirely.
    pub fn from_machines<I>(machines: I) -> Self
    where
        I: IntoIterator,
        I::Item: MachineView,
    {
        machines
            .into_iter()
            .filter(|m| m.is_active())
            .fold(Self::default(), |mut tally, m| {
                tally.add(m.category());
                tally
            })
    }

    /// Build a tally from declared per-category counts.
    pub fn from_declared(b3: usize, c: usize, d: usize, other: usize) -> Self {
        Self {
            total: b3 + c + d + other,
            b3,
            c,
            d,
            other,
        }
    }

    /// Count one active machine.
    pub fn add(&mut self, category: MachineCategory) {
        self.total += 1;
        match category {
            MachineCategory::B3 => self.b3 += 1,
            MachineCategory::C => self.c += 1,
            MachineCategory::D => self.d += 1,
            MachineCategory::Other => self.other += 1,
        }
    }

    /// All active machines, including `OTHER`.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Count for a single category.
    pub fn count(&self, category: MachineCategory) -> usize {
        match category {
            MachineCategory::B3 => self.b3,
            MachineCategory::C => self.c,
            MachineCategory::D => self.d,
            MachineCategory::Other => self.other,
        }
    }

    pub fn b3(&self) -> usize {
        self.b3
    }

    pub fn c(&self) -> usize {
        self.c
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn other(&self) -> usize {
        self.other
    }

    /// Whether the tally has no machines.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::MachineSnapshot;

    #[test]
    fn empty_tally() {
        let tally = MachineTally::from_machines(Vec::<MachineSnapshot>::new());
        assert!(tally.is_empty());
        assert_eq!(tally, MachineTally::default());
    }

    #[test]
    fn counts_by_category() {
        let machines = [
            MachineCategory::B3,
            MachineCategory::C,
            MachineCategory::C,
            MachineCategory::D,
            MachineCategory::Other,
        ];
        let tally = MachineTally::from_machines(machines);
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.b3(), 1);
        assert_eq!(tally.c(), 2);
        assert_eq!(tally.d(), 1);
        assert_eq!(tally.other(), 1);
    }

    #[test]
    fn inactive_machines_are_not_counted() {
        let machines = vec![
            MachineSnapshot::active(MachineCategory::B3),
            MachineSnapshot::inactive(MachineCategory::B3),
            MachineSnapshot::inactive(MachineCategory::C),
            MachineSnapshot::active(MachineCategory::D),
        ];
        let tally = MachineTally::from_machines(&machines);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.b3(), 1);
        assert_eq!(tally.c(), 0);
        assert_eq!(tally.d(), 1);
    }

    #[test]
    fn declared_counts_sum_to_total() {
        let tally = MachineTally::from_declared(2, 5, 3, 4);
        assert_eq!(tally.total(), 14);
        for category in MachineCategory::all() {
            assert!(tally.count(*category) <= tally.total());
        }
        let sum: usize = MachineCategory::all().iter().map(|c| tally.count(*c)).sum();
        assert_eq!(sum, tally.total());
    }
}
