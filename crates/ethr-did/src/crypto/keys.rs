//! secp256k1 and Ed25519 key pairs.
//!
//! secp256k1 keys control ledger accounts: the account address is the last
//! 20 bytes of Keccak-256 over the uncompressed public key (prefix byte
//! dropped). Ed25519 keys can be published as document attributes and used
//! to sign tokens.

use ed25519_dalek::{SigningKey as EdSigningKey, VerifyingKey as EdVerifyingKey};
use k256::ecdsa::{SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{DidError, Result};
use crate::identity::Address;

/// Derive the ledger address controlled by a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}

/// A secp256k1 key pair controlling one ledger address.
///
/// The signing key is zeroized on drop by `k256`.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: Address,
}

impl Secp256k1KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = *signing_key.verifying_key();
        let address = address_from_verifying_key(&verifying_key);
        Self {
            signing_key,
            verifying_key,
            address,
        }
    }

    /// Reconstruct from raw private key bytes.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| DidError::InvalidKey(format!("invalid secp256k1 private key: {e}")))?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Reconstruct from a hex private key, with or without `0x`.
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self> {
        let digits = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = Zeroizing::new(
            hex::decode(digits)
                .map_err(|e| DidError::InvalidKey(format!("invalid private key hex: {e}")))?,
        );
        Self::from_private_key_bytes(&bytes)
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the ledger address controlled by this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Return the compressed public key (33 bytes).
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.verifying_key.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Return the private key as hex. The buffer is wiped on drop.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        let encoded = Zeroizing::new(hex::encode(bytes));
        bytes.zeroize();
        encoded
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// An Ed25519 key pair for token signing.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    signing_key: EdSigningKey,
    verifying_key: EdVerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = EdSigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = EdSigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a verifying key from raw bytes of any length.
    pub fn verifying_key_from_slice(bytes: &[u8]) -> Result<EdVerifyingKey> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DidError::InvalidKey("ed25519 public key must be 32 bytes".into()))?;
        EdVerifyingKey::from_bytes(&array)
            .map_err(|e| DidError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &EdSigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &EdVerifyingKey {
        &self.verifying_key
    }

    /// Return the verifying key bytes.
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public", &hex::encode(self.verifying_key_bytes()))
            .finish_non_exhaustive()
    }
}
