//! Ledger interface — the append-only change log this crate reads and writes.
//!
//! The ledger client itself is an external collaborator. This module names
//! what the core consumes from it ([`Ledger`]), the shape of one logged
//! change ([`ChangeRecord`]), and ships an [`InMemoryLedger`] arena.
//!
//! Records for one identity form a reverse-linked list: each record points
//! at the identity's previous change, and the newest one is found through
//! [`Ledger::latest_change`]. [`ChangeHandle::NONE`] terminates the list.

pub mod memory;

pub use memory::InMemoryLedger;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Opaque pointer to one change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeHandle(pub u64);

impl ChangeHandle {
    /// Sentinel meaning "no earlier change".
    pub const NONE: ChangeHandle = ChangeHandle(0);

    /// Whether this is the end-of-history sentinel.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl std::fmt::Display for ChangeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OwnerChanged,
    DelegateChanged,
    AttributeChanged,
}

impl EventKind {
    /// Return the registry event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnerChanged => "DIDOwnerChanged",
            Self::DelegateChanged => "DIDDelegateChanged",
            Self::AttributeChanged => "DIDAttributeChanged",
        }
    }
}

/// Kind-specific payload of a change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Ownership moved to a new address.
    OwnerChanged { owner: Address },
    /// A delegate of some type was granted (or revoked when expired).
    DelegateChanged {
        delegate_type: String,
        delegate: Address,
    },
    /// An attribute was set (or revoked when expired).
    AttributeChanged { name: String, value: Vec<u8> },
}

impl Change {
    /// Return the event kind of this payload.
    pub fn event_kind(&self) -> EventKind {
        match self {
            Self::OwnerChanged { .. } => EventKind::OwnerChanged,
            Self::DelegateChanged { .. } => EventKind::DelegateChanged,
            Self::AttributeChanged { .. } => EventKind::AttributeChanged,
        }
    }
}

/// One immutable entry of an identity's change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Identity the change applies to.
    pub identity: Address,
    /// Absolute expiry instant (seconds). `0` marks a revocation.
    pub valid_to: u64,
    /// What changed.
    pub change: Change,
    /// The identity's previous change, or [`ChangeHandle::NONE`].
    pub previous: ChangeHandle,
}

impl ChangeRecord {
    /// Return the event kind of this record.
    pub fn event_kind(&self) -> EventKind {
        self.change.event_kind()
    }

    /// Whether the record's effect is still honored at `now`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.valid_to > now
    }
}

/// Failures reported by the ledger client. Propagated unchanged.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// What the core consumes from a ledger client.
///
/// Implementations may block on network round trips. No method retries;
/// retry policy belongs to the client.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Most recent change for `identity`, or [`ChangeHandle::NONE`].
    async fn latest_change(&self, identity: &Address) -> Result<ChangeHandle, LedgerError>;

    /// Dereference one change record. `None` if the handle points nowhere.
    async fn read_change(&self, handle: ChangeHandle) -> Result<Option<ChangeRecord>, LedgerError>;

    /// The ledger's notion of "now", in seconds.
    async fn current_instant(&self) -> Result<u64, LedgerError>;

    /// Append a change and wait until it is committed.
    async fn submit_change(
        &self,
        identity: &Address,
        change: Change,
        valid_to: u64,
    ) -> Result<ChangeHandle, LedgerError>;
}
