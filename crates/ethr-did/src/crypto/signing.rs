//! Token signature primitives.
//!
//! `ES256K-R`: SHA-256 over the message, secp256k1 ECDSA, encoded as the
//! 64-byte `r || s` followed by the one-byte recovery id. Verification
//! recovers the public key, so a signer can be matched against a bare
//! ledger address.
//!
//! `Ed25519`: plain Ed25519 over the message.

use ed25519_dalek::{Signature as EdSignature, Signer, Verifier, VerifyingKey as EdVerifyingKey};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{DidError, Result};

/// Length of a recoverable secp256k1 signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Sign a message with a secp256k1 key, returning `r || s || v`.
pub fn sign_recoverable(
    signing_key: &SigningKey,
    message: &[u8],
) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN]> {
    let digest = Sha256::digest(message);
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| DidError::InvalidKey(format!("secp256k1 signing failed: {e}")))?;

    let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}

/// Recover the secp256k1 public key that produced a recoverable signature.
///
/// Accepts recovery ids in both the raw (0/1) and the legacy (27/28) form.
pub fn recover(message: &[u8], signature: &[u8]) -> Result<VerifyingKey> {
    if signature.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(DidError::InvalidToken(format!(
            "recoverable signature must be {RECOVERABLE_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| DidError::SignatureInvalid)?;
    let v = match signature[64] {
        v @ (27 | 28) => v - 27,
        v => v,
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or(DidError::SignatureInvalid)?;
    let digest = Sha256::digest(message);
    VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| DidError::SignatureInvalid)
}

/// Sign a message with an Ed25519 signing key.
pub fn sign_ed25519(signing_key: &ed25519_dalek::SigningKey, message: &[u8]) -> [u8; 64] {
    signing_key.sign(message).to_bytes()
}

/// Verify an Ed25519 signature against a public key and message.
pub fn verify_ed25519(
    verifying_key: &EdVerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let sig_array: [u8; 64] = signature
        .try_into()
        .map_err(|_| DidError::InvalidToken("ed25519 signature must be 64 bytes".into()))?;
    let signature = EdSignature::from_bytes(&sig_array);
    verifying_key
        .verify(message, &signature)
        .map_err(|_| DidError::SignatureInvalid)
}
