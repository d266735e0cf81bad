//! Delegate and attribute indexing.
//!
//! Picks the entries that are live at an instant and numbers them. Entries
//! are grouped by a stable key (delegate type + delegate, or attribute name
//! + value); only the newest record of each group counts, and the group is
//! live iff that record's `valid_to` is after `now`. Live entries keep the
//! chronological position of their newest record.
//!
//! Numbers are re-derived from scratch on every resolution. An entry that
//! expired or was revoked no longer takes part, so re-adding it later gives
//! the next free number rather than its old one.

use std::collections::HashSet;

use crate::identity::Address;
use crate::ledger::{Change, ChangeRecord};

/// Local identifier of the synthetic owner entry.
pub const OWNER_FRAGMENT: &str = "owner";

/// Grouping key for delegate and attribute records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey<'a> {
    Delegate {
        delegate_type: &'a str,
        delegate: Address,
    },
    Attribute {
        name: &'a str,
        value: &'a [u8],
    },
}

impl<'a> EntryKey<'a> {
    /// The grouping key of a record. Owner changes have none.
    pub fn of(record: &'a ChangeRecord) -> Option<Self> {
        match &record.change {
            Change::OwnerChanged { .. } => None,
            Change::DelegateChanged {
                delegate_type,
                delegate,
            } => Some(Self::Delegate {
                delegate_type,
                delegate: *delegate,
            }),
            Change::AttributeChanged { name, value } => Some(Self::Attribute { name, value }),
        }
    }
}

/// Select the live delegate and attribute records, oldest first.
///
/// `history` must be most recent first, as produced by traversal.
pub fn live_entries(history: &[ChangeRecord], now: u64) -> Vec<&ChangeRecord> {
    let mut seen: HashSet<EntryKey<'_>> = HashSet::new();
    let mut live = Vec::new();

    for record in history {
        let Some(key) = EntryKey::of(record) else {
            continue;
        };
        if !seen.insert(key) {
            // Superseded by a newer record of the same group.
            continue;
        }
        if record.is_valid_at(now) {
            live.push(record);
        } else {
            log::trace!(
                "skipping {} for {}: valid_to {} <= now {now}",
                record.event_kind().as_str(),
                record.identity,
                record.valid_to
            );
        }
    }

    live.reverse();
    live
}

/// Hands out `delegate-<n>` identifiers in emission order, starting at 1.
///
/// One counter is shared by delegates and attribute public keys.
#[derive(Debug, Default)]
pub struct KeyIndexer {
    issued: usize,
}

impl KeyIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next local identifier.
    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        delegate_fragment(self.issued)
    }

    /// How many identifiers were handed out so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// The local identifier of the `n`-th numbered entry.
pub fn delegate_fragment(n: usize) -> String {
    format!("delegate-{n}")
}

/// Parse a `delegate-<n>` local identifier.
pub fn parse_delegate_fragment(fragment: &str) -> Option<usize> {
    fragment
        .strip_prefix("delegate-")?
        .parse()
        .ok()
        .filter(|n| *n > 0)
}
