//! ethr-did — Ledger-anchored DIDs and the tokens they sign.
//!
//! Derives DID documents from an identity's append-only change log
//! (owner changes, delegates, attributes), controls identities by writing
//! to that log, and signs and verifies compact tokens against the
//! resolved documents.

pub mod config;
pub mod controller;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod resolver;
pub mod time;
pub mod token;

// Re-export primary types
pub use config::DidConfig;
pub use controller::{AttributeValue, DelegateOptions, IdentityController};
pub use crypto::{Ed25519KeyPair, Secp256k1KeyPair};
pub use error::{DidError, Result};
pub use identity::{Address, Did};
pub use ledger::{Change, ChangeHandle, ChangeRecord, InMemoryLedger, Ledger, LedgerError};

// Re-export resolution types
pub use resolver::{
    AuthenticationRef, DelegateType, Document, KeyMaterial, ResolvedKey, ResolvedService, Resolver,
};

// Re-export token types
pub use token::{
    decode_token, sign_token, verify_token, Algorithm, Claims, SignOptions, SigningCapability,
    VerifiedToken, VerifyOptions,
};
