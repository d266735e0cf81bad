//! Token signing.

use serde_json::Value;

use crate::crypto::signing::{sign_ed25519, sign_recoverable};
use crate::crypto::{Ed25519KeyPair, Secp256k1KeyPair};
use crate::error::{DidError, Result};
use crate::identity::Did;

use super::jwt::{encode_bytes, encode_segment, Algorithm, Claims, Header};

/// Private key material bound to one key entry of a document.
#[derive(Debug, Clone)]
pub enum SigningCapability {
    /// The owner key or a secp256k1 delegate. Signs `ES256K-R`.
    Secp256k1(Secp256k1KeyPair),
    /// An Ed25519 key published as an attribute. Signs `Ed25519`.
    Ed25519(Ed25519KeyPair),
}

impl SigningCapability {
    /// The algorithm this capability signs with.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Secp256k1(_) => Algorithm::Es256kR,
            Self::Ed25519(_) => Algorithm::Ed25519,
        }
    }

    /// Sign a JWS signing input.
    pub fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Secp256k1(kp) => Ok(sign_recoverable(kp.signing_key(), signing_input)?.to_vec()),
            Self::Ed25519(kp) => Ok(sign_ed25519(kp.signing_key(), signing_input).to_vec()),
        }
    }
}

impl From<Secp256k1KeyPair> for SigningCapability {
    fn from(kp: Secp256k1KeyPair) -> Self {
        Self::Secp256k1(kp)
    }
}

impl From<Ed25519KeyPair> for SigningCapability {
    fn from(kp: Ed25519KeyPair) -> Self {
        Self::Ed25519(kp)
    }
}

/// Options for [`sign_token`].
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Intended recipient. Overrides any `aud` claim.
    pub audience: Option<Did>,
    /// Lifetime in seconds from `iat`. Ignored if the claims carry `exp`.
    pub expires_in: Option<u64>,
}

/// Sign `claims` as `issuer`.
///
/// `issued_at` is the ledger instant. The payload always carries `iat` and
/// `iss`; `iss` cannot be overridden by the claims.
pub fn sign_token(
    issuer: &Did,
    signer: Option<&SigningCapability>,
    claims: Claims,
    options: &SignOptions,
    issued_at: u64,
) -> Result<String> {
    let signer = signer.ok_or(DidError::NoSignerConfigured)?;

    let mut payload = Claims::new();
    payload.insert("iat".into(), Value::from(issued_at));
    payload.extend(claims);
    payload.insert("iss".into(), Value::from(issuer.to_string()));
    if let Some(audience) = &options.audience {
        payload.insert("aud".into(), Value::from(audience.to_string()));
    }
    if let Some(lifetime) = options.expires_in {
        payload
            .entry("exp")
            .or_insert_with(|| Value::from(issued_at.saturating_add(lifetime)));
    }

    let algorithm = signer.algorithm();
    let signing_input = format!(
        "{}.{}",
        encode_segment(&Header::new(algorithm))?,
        encode_segment(&payload)?
    );
    let signature = signer.sign(signing_input.as_bytes())?;

    log::debug!("signed {} token for {issuer}", algorithm.as_str());
    Ok(format!("{signing_input}.{}", encode_bytes(&signature)))
}
