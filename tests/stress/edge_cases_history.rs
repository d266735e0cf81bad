//! Edge cases: malformed histories, unusual records and ledger failures.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use ethr_did::{
    Address, Change, ChangeHandle, ChangeRecord, DidError, Document, IdentityController,
    InMemoryLedger, Ledger, LedgerError, Resolver,
};

const NOW: u64 = 1_000;

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

/// Serves whatever records it is given, however inconsistent.
#[derive(Default)]
struct ScriptedLedger {
    latest: HashMap<Address, ChangeHandle>,
    records: HashMap<ChangeHandle, ChangeRecord>,
    offline: bool,
}

impl ScriptedLedger {
    fn record(mut self, handle: u64, identity: Address, previous: u64) -> Self {
        self.records.insert(
            ChangeHandle(handle),
            ChangeRecord {
                identity,
                valid_to: NOW + 100,
                change: Change::DelegateChanged {
                    delegate_type: "Secp256k1VerificationKey2018".into(),
                    delegate: addr(handle as u8),
                },
                previous: ChangeHandle(previous),
            },
        );
        self
    }

    fn latest(mut self, identity: Address, handle: u64) -> Self {
        self.latest.insert(identity, ChangeHandle(handle));
        self
    }
}

#[async_trait]
impl Ledger for ScriptedLedger {
    async fn latest_change(&self, identity: &Address) -> Result<ChangeHandle, LedgerError> {
        if self.offline {
            return Err(LedgerError::Unavailable("node offline".into()));
        }
        Ok(self.latest.get(identity).copied().unwrap_or(ChangeHandle::NONE))
    }

    async fn read_change(&self, handle: ChangeHandle) -> Result<Option<ChangeRecord>, LedgerError> {
        Ok(self.records.get(&handle).cloned())
    }

    async fn current_instant(&self) -> Result<u64, LedgerError> {
        if self.offline {
            return Err(LedgerError::Unavailable("node offline".into()));
        }
        Ok(NOW)
    }

    async fn submit_change(
        &self,
        _identity: &Address,
        _change: Change,
        _valid_to: u64,
    ) -> Result<ChangeHandle, LedgerError> {
        Err(LedgerError::Rejected("read-only".into()))
    }
}

async fn resolve(ledger: ScriptedLedger, identity: Address) -> Result<Document, DidError> {
    Resolver::new(Arc::new(ledger))
        .resolve_address(&identity)
        .await
}

#[tokio::test]
async fn edge_well_formed_scripted_history() {
    let ledger = ScriptedLedger::default()
        .record(1, addr(1), 0)
        .record(5, addr(1), 1)
        .latest(addr(1), 5);
    let doc = resolve(ledger, addr(1)).await.expect("resolve");
    assert_eq!(doc.public_key.len(), 3);
}

#[tokio::test]
async fn edge_cycle_is_corrupt() {
    let ledger = ScriptedLedger::default()
        .record(2, addr(1), 3)
        .record(3, addr(1), 2)
        .latest(addr(1), 3);
    assert!(matches!(
        resolve(ledger, addr(1)).await,
        Err(DidError::CorruptHistory(_))
    ));
}

#[tokio::test]
async fn edge_self_link_is_corrupt() {
    let ledger = ScriptedLedger::default()
        .record(4, addr(1), 4)
        .latest(addr(1), 4);
    assert!(matches!(
        resolve(ledger, addr(1)).await,
        Err(DidError::CorruptHistory(_))
    ));
}

#[tokio::test]
async fn edge_dangling_link_is_corrupt() {
    let ledger = ScriptedLedger::default()
        .record(4, addr(1), 2)
        .latest(addr(1), 4);
    assert!(matches!(
        resolve(ledger, addr(1)).await,
        Err(DidError::CorruptHistory(_))
    ));
}

#[tokio::test]
async fn edge_foreign_record_is_corrupt() {
    let ledger = ScriptedLedger::default()
        .record(1, addr(2), 0)
        .record(2, addr(1), 1)
        .latest(addr(1), 2);
    assert!(matches!(
        resolve(ledger, addr(1)).await,
        Err(DidError::CorruptHistory(_))
    ));
}

#[tokio::test]
async fn edge_ledger_errors_propagate() {
    let ledger = ScriptedLedger {
        offline: true,
        ..ScriptedLedger::default()
    };
    assert!(matches!(
        resolve(ledger, addr(1)).await,
        Err(DidError::Ledger(LedgerError::Unavailable(_)))
    ));
}

#[tokio::test]
async fn edge_rejected_write_propagates() {
    let controller = IdentityController::new(addr(1), Arc::new(ScriptedLedger::default()));
    assert!(matches!(
        controller.change_owner(addr(2)).await,
        Err(DidError::Ledger(LedgerError::Rejected(_)))
    ));
}

#[tokio::test]
async fn edge_unknown_records_take_no_index() {
    let ledger = Arc::new(InMemoryLedger::with_instant(NOW));
    let identity = addr(1);
    for change in [
        Change::DelegateChanged {
            delegate_type: "enc".into(),
            delegate: addr(2),
        },
        Change::AttributeChanged {
            name: "did/unknown/Thing".into(),
            value: b"x".to_vec(),
        },
        Change::AttributeChanged {
            name: "did/service/HubService".into(),
            value: b"https://hub.example".to_vec(),
        },
        Change::DelegateChanged {
            delegate_type: "Secp256k1VerificationKey2018".into(),
            delegate: addr(3),
        },
    ] {
        ledger
            .submit_change(&identity, change, NOW + 10)
            .await
            .expect("submit");
    }

    let doc = Resolver::new(Arc::clone(&ledger))
        .resolve_address(&identity)
        .await
        .expect("resolve");
    assert_eq!(doc.public_key.len(), 2);
    assert_eq!(doc.public_key[1].local_id(), "delegate-1");
    assert_eq!(doc.service.len(), 1);
}

#[tokio::test]
async fn edge_expiry_boundary_is_exclusive() {
    let ledger = Arc::new(InMemoryLedger::with_instant(NOW));
    ledger
        .submit_change(
            &addr(1),
            Change::DelegateChanged {
                delegate_type: "Secp256k1VerificationKey2018".into(),
                delegate: addr(2),
            },
            NOW,
        )
        .await
        .expect("submit");
    let resolver = Resolver::new(Arc::clone(&ledger));
    let doc = resolver.resolve_address(&addr(1)).await.expect("resolve");
    assert_eq!(doc.public_key.len(), 1, "valid_to == now is already expired");
}

#[tokio::test]
async fn edge_newest_record_per_delegate_wins() {
    let ledger = Arc::new(InMemoryLedger::with_instant(NOW));
    let delegate = Change::DelegateChanged {
        delegate_type: "Secp256k1VerificationKey2018".into(),
        delegate: addr(2),
    };
    // A long grant followed by a short one: the short one is authoritative.
    ledger
        .submit_change(&addr(1), delegate.clone(), NOW + 1_000)
        .await
        .expect("long grant");
    ledger
        .submit_change(&addr(1), delegate, NOW + 5)
        .await
        .expect("short grant");

    let resolver = Resolver::new(Arc::clone(&ledger));
    assert_eq!(
        resolver.resolve_address(&addr(1)).await.expect("resolve").public_key.len(),
        2
    );
    ledger.advance(5);
    assert_eq!(
        resolver.resolve_address(&addr(1)).await.expect("resolve").public_key.len(),
        1
    );
}

#[tokio::test]
async fn edge_resolution_is_deterministic() {
    let ledger = Arc::new(InMemoryLedger::with_instant(NOW));
    for i in 2..10u8 {
        ledger
            .submit_change(
                &addr(1),
                Change::DelegateChanged {
                    delegate_type: "Secp256k1SignatureAuthentication2018".into(),
                    delegate: addr(i),
                },
                NOW + u64::from(i),
            )
            .await
            .expect("submit");
    }
    let resolver = Resolver::new(Arc::clone(&ledger));
    let first = resolver.resolve_address(&addr(1)).await.expect("resolve");
    let second = resolver.resolve_address(&addr(1)).await.expect("resolve");
    assert_eq!(first, second);
    assert_eq!(first.to_json(), second.to_json());
}
