//! Stress test: resolution over long change histories.

use std::sync::Arc;

use ethr_did::{
    Address, DelegateOptions, DelegateType, IdentityController, InMemoryLedger, Resolver,
};

const START: u64 = 1_700_000_000;

fn delegate(i: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[16..].copy_from_slice(&i.to_be_bytes());
    bytes[0] = 0xde;
    Address::from_bytes(bytes)
}

#[tokio::test]
async fn stress_1000_delegates_numbered_in_order() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = IdentityController::new(Address::from_bytes([1; 20]), Arc::clone(&ledger));

    for i in 0..1000 {
        controller
            .add_delegate(delegate(i), DelegateOptions::default())
            .await
            .expect("add delegate");
    }

    let doc = controller.resolve_document().await.expect("resolve");
    assert_eq!(doc.public_key.len(), 1001);
    for (i, key) in doc.public_key.iter().skip(1).enumerate() {
        assert_eq!(key.local_id(), format!("delegate-{}", i + 1));
        assert_eq!(
            key.material,
            ethr_did::KeyMaterial::EthereumAddress(delegate(i as u32))
        );
    }
}

#[tokio::test]
async fn stress_repeated_grant_and_revoke() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = IdentityController::new(Address::from_bytes([2; 20]), Arc::clone(&ledger));
    let flapping = delegate(7);
    let options = DelegateOptions {
        delegate_type: DelegateType::SignatureAuthentication,
        expires_in: Some(3_600),
    };

    for _ in 0..500 {
        controller
            .add_delegate(flapping, options)
            .await
            .expect("grant");
        controller
            .revoke_delegate(flapping, DelegateType::SignatureAuthentication)
            .await
            .expect("revoke");
    }
    let history = controller
        .resolver()
        .history(&controller.address())
        .await
        .expect("history");
    assert_eq!(history.len(), 1000);

    let doc = controller.resolve_document().await.expect("resolve");
    assert_eq!(doc.public_key.len(), 1, "last record for the delegate is a revocation");

    controller
        .add_delegate(flapping, options)
        .await
        .expect("final grant");
    let doc = controller.resolve_document().await.expect("resolve");
    assert_eq!(doc.public_key.len(), 2);
    assert_eq!(doc.authentication.len(), 2);
}

#[tokio::test]
async fn stress_interleaved_identities_share_one_ledger() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controllers: Vec<_> = (0..20u8)
        .map(|i| IdentityController::new(Address::from_bytes([i + 10; 20]), Arc::clone(&ledger)))
        .collect();

    for round in 0..50 {
        for controller in &controllers {
            controller
                .add_delegate(delegate(round), DelegateOptions::default())
                .await
                .expect("add delegate");
        }
    }
    assert_eq!(ledger.len(), 1000);

    let resolver = Resolver::new(Arc::clone(&ledger));
    for controller in &controllers {
        let doc = resolver.resolve(controller.did()).await.expect("resolve");
        assert_eq!(doc.public_key.len(), 51);
    }
}

#[tokio::test]
async fn stress_mass_expiry() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = IdentityController::new(Address::from_bytes([3; 20]), Arc::clone(&ledger));

    for i in 0..300 {
        let expires_in = if i % 3 == 0 { 1_000 } else { 10 };
        controller
            .add_delegate(
                delegate(i),
                DelegateOptions {
                    delegate_type: DelegateType::VerificationKey,
                    expires_in: Some(expires_in),
                },
            )
            .await
            .expect("add delegate");
    }
    ledger.advance(10);

    let doc = controller.resolve_document().await.expect("resolve");
    assert_eq!(doc.public_key.len(), 101);
    assert_eq!(doc.public_key[1].local_id(), "delegate-1");
    assert_eq!(doc.public_key[100].local_id(), "delegate-100");
    assert_eq!(
        doc.public_key[100].material,
        ethr_did::KeyMaterial::EthereumAddress(delegate(297))
    );
}
