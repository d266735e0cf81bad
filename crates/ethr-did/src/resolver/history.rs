//! Change-log traversal.
//!
//! Walks one identity's reverse-linked change records from the newest to
//! the oldest. Every step must move strictly backwards, which rules out
//! cycles; a dangling handle, a foreign record or a non-decreasing link is
//! reported as [`DidError::CorruptHistory`].

use crate::error::{DidError, Result};
use crate::identity::Address;
use crate::ledger::{ChangeHandle, ChangeRecord, Ledger};

/// Read the complete history of `identity`, most recent first.
pub async fn read_history<L: Ledger + ?Sized>(
    ledger: &L,
    identity: &Address,
) -> Result<Vec<ChangeRecord>> {
    let latest = ledger.latest_change(identity).await?;
    walk_from(ledger, identity, latest).await
}

/// Read the history of `identity` starting at an explicit entry point.
pub async fn walk_from<L: Ledger + ?Sized>(
    ledger: &L,
    identity: &Address,
    entry: ChangeHandle,
) -> Result<Vec<ChangeRecord>> {
    let mut history = Vec::new();
    let mut handle = entry;

    while !handle.is_none() {
        let record = ledger
            .read_change(handle)
            .await?
            .ok_or_else(|| corrupt(identity, format!("dangling handle {handle}")))?;

        if record.identity != *identity {
            return Err(corrupt(
                identity,
                format!("record {handle} belongs to {}", record.identity),
            ));
        }
        if record.previous >= handle {
            return Err(corrupt(
                identity,
                format!("record {handle} links forward to {}", record.previous),
            ));
        }

        handle = record.previous;
        history.push(record);
    }

    log::trace!("read {} change(s) for {identity}", history.len());
    Ok(history)
}

fn corrupt(identity: &Address, detail: String) -> DidError {
    log::warn!("corrupt change history for {identity}: {detail}");
    DidError::CorruptHistory(format!("{identity}: {detail}"))
}
