//! In-memory ledger — an append-only arena of change records.
//!
//! Handles are 1-based positions in the arena; position 0 is the
//! [`ChangeHandle::NONE`] sentinel. The clock is explicit and only moves
//! when told to, which keeps resolution at a given instant reproducible.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::identity::Address;

use super::{Change, ChangeHandle, ChangeRecord, Ledger, LedgerError};

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<ChangeRecord>,
    latest: HashMap<Address, ChangeHandle>,
}

/// Append-only ledger kept in process memory.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    clock: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger whose clock starts at wall-clock now.
    pub fn new() -> Self {
        Self::with_instant(crate::time::now_secs())
    }

    /// Create an empty ledger whose clock starts at `instant`.
    pub fn with_instant(instant: u64) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            clock: AtomicU64::new(instant),
        }
    }

    /// Move the clock to an absolute instant.
    pub fn set_instant(&self, instant: u64) {
        self.clock.store(instant, Ordering::SeqCst);
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: u64) -> u64 {
        self.clock.fetch_add(secs, Ordering::SeqCst) + secs
    }

    /// Total number of records across all identities.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether no change has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index_of(handle: ChangeHandle) -> Option<usize> {
        usize::try_from(handle.0).ok()?.checked_sub(1)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn latest_change(&self, identity: &Address) -> Result<ChangeHandle, LedgerError> {
        Ok(self
            .state
            .read()
            .latest
            .get(identity)
            .copied()
            .unwrap_or(ChangeHandle::NONE))
    }

    async fn read_change(&self, handle: ChangeHandle) -> Result<Option<ChangeRecord>, LedgerError> {
        let Some(index) = Self::index_of(handle) else {
            return Ok(None);
        };
        Ok(self.state.read().records.get(index).cloned())
    }

    async fn current_instant(&self) -> Result<u64, LedgerError> {
        Ok(self.clock.load(Ordering::SeqCst))
    }

    async fn submit_change(
        &self,
        identity: &Address,
        change: Change,
        valid_to: u64,
    ) -> Result<ChangeHandle, LedgerError> {
        let mut state = self.state.write();
        let previous = state
            .latest
            .get(identity)
            .copied()
            .unwrap_or(ChangeHandle::NONE);
        state.records.push(ChangeRecord {
            identity: *identity,
            valid_to,
            change,
            previous,
        });
        let handle = ChangeHandle(state.records.len() as u64);
        state.latest.insert(*identity, handle);
        log::trace!("ledger appended {handle} for {identity} (previous {previous})");
        Ok(handle)
    }
}
