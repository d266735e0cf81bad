//! Integration test: signing and verifying tokens between identities.

use std::sync::Arc;

use serde_json::json;

use ethr_did::{
    verify_token, Claims, DelegateType, DidError, Ed25519KeyPair, IdentityController,
    InMemoryLedger, Resolver, Secp256k1KeyPair, SignOptions, VerifyOptions,
};

const START: u64 = 1_700_000_000;

fn claims(hello: &str) -> Claims {
    let mut claims = Claims::new();
    claims.insert("hello".into(), json!(hello));
    claims
}

fn plain_controller(ledger: &Arc<InMemoryLedger>) -> IdentityController<InMemoryLedger> {
    IdentityController::from_key_pair(Secp256k1KeyPair::generate(), Arc::clone(ledger))
}

#[tokio::test]
async fn token_signing_requires_signer() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller =
        IdentityController::new(Secp256k1KeyPair::generate().address(), Arc::clone(&ledger));

    let err = controller
        .sign_token(claims("world"), SignOptions::default())
        .await
        .expect_err("no signer configured");
    assert!(matches!(err, DidError::NoSignerConfigured));
    assert_eq!(err.to_string(), "No signer configured");
}

#[tokio::test]
async fn token_plain_keypair_account() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let plain = plain_controller(&ledger);

    let jwt = plain
        .sign_token(claims("world"), SignOptions::default())
        .await
        .expect("sign");
    let resolver = Resolver::new(Arc::clone(&ledger));
    let verified = verify_token(&resolver, &jwt, &VerifyOptions::default())
        .await
        .expect("verify");

    assert_eq!(&verified.issuer, plain.did());
    assert_eq!(verified.payload["hello"], json!("world"));
    assert_eq!(verified.signer.id, plain.did().url("owner"));
}

#[tokio::test]
async fn token_signed_by_generated_delegate() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let identity = Secp256k1KeyPair::generate().address();
    let controller = IdentityController::new(identity, Arc::clone(&ledger));
    let verifier = plain_controller(&ledger);

    let delegate = controller
        .create_signing_delegate(DelegateType::VerificationKey, Some(60))
        .await
        .expect("create delegate");
    let jwt = controller
        .sign_token(claims("friend"), SignOptions::default())
        .await
        .expect("sign");

    let verified = verifier.verify_token(&jwt).await.expect("verify");
    assert_eq!(&verified.issuer, controller.did());
    assert_eq!(verified.signer.local_id(), "delegate-1");
    assert_eq!(
        verified.signer.material,
        ethr_did::KeyMaterial::EthereumAddress(delegate.address())
    );

    // Only authentication keys when asked to.
    assert!(matches!(
        verifier.verify_token_with(&jwt, true).await,
        Err(DidError::NoMatchingKey { .. })
    ));

    // Once the delegate expires the same token no longer verifies.
    ledger.advance(60);
    assert!(matches!(
        verifier.verify_token(&jwt).await,
        Err(DidError::NoMatchingKey { .. })
    ));
}

#[tokio::test]
async fn token_revoked_delegate_stops_verifying() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = plain_controller(&ledger);
    let delegate = controller
        .create_signing_delegate(DelegateType::SignatureAuthentication, None)
        .await
        .expect("create delegate");

    let jwt = controller
        .sign_token(claims("world"), SignOptions::default())
        .await
        .expect("sign");
    let verified = controller.verify_token_with(&jwt, true).await.expect("verify");
    assert_eq!(verified.signer.local_id(), "delegate-1");

    controller
        .revoke_delegate(delegate.address(), DelegateType::SignatureAuthentication)
        .await
        .expect("revoke");
    assert!(controller.verify_token(&jwt).await.is_err());
}

#[tokio::test]
async fn token_audience_claim() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let issuer = plain_controller(&ledger);
    let verifier = plain_controller(&ledger);

    // Audience from a caller claim.
    let mut for_verifier = claims("friend");
    for_verifier.insert("aud".into(), json!(verifier.did().to_string()));
    let jwt = issuer
        .sign_token(for_verifier, SignOptions::default())
        .await
        .expect("sign");
    let verified = verifier.verify_token(&jwt).await.expect("verify");
    assert_eq!(&verified.issuer, issuer.did());

    // Audience naming someone else.
    let jwt = issuer
        .sign_token(
            claims("friend"),
            SignOptions {
                audience: Some(issuer.did().clone()),
                expires_in: None,
            },
        )
        .await
        .expect("sign");
    let err = verifier.verify_token(&jwt).await.expect_err("wrong audience");
    assert_eq!(
        err.to_string(),
        format!(
            "JWT audience does not match your DID: aud: {} !== yours: {}",
            issuer.did(),
            verifier.did()
        )
    );

    // A verifier without a DID cannot accept audience-restricted tokens.
    let resolver = Resolver::new(Arc::clone(&ledger));
    assert!(matches!(
        verify_token(&resolver, &jwt, &VerifyOptions::default()).await,
        Err(DidError::AudienceRequired)
    ));
}

#[tokio::test]
async fn token_ed25519_attribute_signer() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let owner = Secp256k1KeyPair::generate();
    let controller = IdentityController::new(owner.address(), Arc::clone(&ledger));
    let ed = Ed25519KeyPair::generate();

    controller
        .set_attribute(
            "did/publicKey/Ed25519VerificationKey2018/publicKeyBase64",
            ed.verifying_key_bytes().to_vec(),
            Some(3_600),
        )
        .await
        .expect("publish key");
    controller.set_signer(ed).await;

    let jwt = controller
        .sign_token(claims("world"), SignOptions::default())
        .await
        .expect("sign");
    let verified = controller.verify_token(&jwt).await.expect("verify");
    assert_eq!(verified.signer.key_type, "Ed25519VerificationKey2018");
    assert_eq!(verified.signer.local_id(), "delegate-1");
}

#[tokio::test]
async fn token_expiry_on_ledger_clock() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = plain_controller(&ledger);
    let jwt = controller
        .sign_token(
            claims("world"),
            SignOptions {
                audience: None,
                expires_in: Some(120),
            },
        )
        .await
        .expect("sign");

    ledger.advance(119);
    assert!(controller.verify_token(&jwt).await.is_ok());
    ledger.advance(1);
    assert!(matches!(
        controller.verify_token(&jwt).await,
        Err(DidError::TokenExpired { .. })
    ));
}

#[tokio::test]
async fn token_rejects_garbage() {
    let ledger = Arc::new(InMemoryLedger::with_instant(START));
    let controller = plain_controller(&ledger);
    assert!(matches!(
        controller.verify_token("not-a-token").await,
        Err(DidError::InvalidToken(_))
    ));
}
