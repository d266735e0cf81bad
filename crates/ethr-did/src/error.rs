//! Error types for ethr-did.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

use crate::ledger::LedgerError;

/// Error type covering resolution, controller writes and token handling.
#[derive(Debug, thiserror::Error)]
pub enum DidError {
    #[error("Corrupt change history: {0}")]
    CorruptHistory(String),

    #[error("No signer configured")]
    NoSignerConfigured,

    #[error("JWT audience does not match your DID: aud: {audience} !== yours: {verifier}")]
    AudienceMismatch { audience: String, verifier: String },

    #[error("JWT audience is required but your DID has not been configured")]
    AudienceRequired,

    #[error("No public key of {issuer} verifies the token signature")]
    NoMatchingKey { issuer: String },

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token expired at {exp} (now {now})")]
    TokenExpired { exp: u64, now: u64 },

    #[error("Token not valid before {nbf} (now {now})")]
    TokenNotYetValid { nbf: u64, now: u64 },

    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for DidError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, DidError>;
