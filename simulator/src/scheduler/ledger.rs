/// ----- HALL CALL LEDGER -----
/// Who is going to serve which hall call. The centralized scheduler uses it as
/// its assignment table, the decentralized one as its claim board. Every
/// read-check-write happens under the ledger's own lock, so two cars can never
/// end up holding the same call.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use shared_resources::call::{CarId, HallCall};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub call: HallCall,
    pub holder: Option<CarId>,
}

#[derive(Debug, Default)]
pub struct HallCallLedger {
    entries: Mutex<BTreeMap<HallCall, Option<CarId>>>,
}

impl HallCallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts `call` as unclaimed. Never overwrites an existing entry.
    pub fn open(&self, call: HallCall) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&call) {
            return false;
        }
        entries.insert(call, None);
        true
    }

    /// Commits `car` to `call` unless the call already has an entry.
    pub fn assign(&self, call: HallCall, car: CarId) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&call) {
            return false;
        }
        entries.insert(call, Some(car));
        true
    }

    /// Claims the unclaimed call nearest to `floor` for `car`. Ties go to the
    /// lowest floor, up before down.
    pub fn claim_nearest(&self, car: CarId, floor: u8) -> Option<HallCall> {
        let mut entries = self.entries.lock();
        let nearest = entries
            .iter()
            .filter(|(_, holder)| holder.is_none())
            .map(|(call, _)| *call)
            .min_by_key(|call| call.floor.abs_diff(floor))?;
        entries.insert(nearest, Some(car));
        Some(nearest)
    }

    pub fn contains(&self, call: HallCall) -> bool {
        self.entries.lock().contains_key(&call)
    }

    pub fn holder(&self, call: HallCall) -> Option<CarId> {
        self.entries.lock().get(&call).copied().flatten()
    }

    /// Removes `call` if `car` holds it.
    pub fn release(&self, call: HallCall, car: CarId) -> bool {
        let mut entries = self.entries.lock();
        if entries.get(&call) == Some(&Some(car)) {
            entries.remove(&call);
            return true;
        }
        false
    }

    pub fn held_by(&self, car: CarId) -> Vec<HallCall> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, holder)| **holder == Some(car))
            .map(|(call, _)| *call)
            .collect()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .iter()
            .map(|(call, holder)| LedgerEntry { call: *call, holder: *holder })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
