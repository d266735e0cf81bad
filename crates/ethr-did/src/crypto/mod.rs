//! Cryptographic primitives for ethr-did.
//!
//! This module provides:
//! - secp256k1 key pairs and ledger address derivation (Keccak-256)
//! - recoverable secp256k1 signatures (`ES256K-R`)
//! - Ed25519 key pairs and signatures

pub mod keys;
pub mod signing;

pub use keys::{address_from_verifying_key, Ed25519KeyPair, Secp256k1KeyPair};
