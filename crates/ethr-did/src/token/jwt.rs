//! Compact JWS encoding: `b64url(header).b64url(payload).b64url(signature)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DidError, Result};

/// A token's claim set.
pub type Claims = serde_json::Map<String, Value>;

/// Supported signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Recoverable secp256k1 over SHA-256.
    Es256kR,
    /// Ed25519.
    Ed25519,
}

impl Algorithm {
    /// Return the `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es256kR => "ES256K-R",
            Self::Ed25519 => "Ed25519",
        }
    }

    /// Parse an `alg` header value.
    pub fn parse(alg: &str) -> Result<Self> {
        match alg {
            "ES256K-R" => Ok(Self::Es256kR),
            "Ed25519" | "EdDSA" => Ok(Self::Ed25519),
            other => Err(DidError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// JOSE header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub typ: String,
    pub alg: String,
}

impl Header {
    pub fn new(alg: Algorithm) -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: alg.as_str().to_string(),
        }
    }
}

/// A structurally valid token whose signature has not been checked.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: Header,
    pub payload: Claims,
    /// `header.payload` exactly as it appeared in the token.
    pub signing_input: String,
    pub signature: Vec<u8>,
}

impl DecodedToken {
    /// The declared algorithm.
    pub fn algorithm(&self) -> Result<Algorithm> {
        Algorithm::parse(&self.header.alg)
    }

    /// The `iss` claim, unverified.
    pub fn issuer(&self) -> Result<&str> {
        self.payload
            .get("iss")
            .and_then(Value::as_str)
            .ok_or_else(|| DidError::InvalidToken("missing iss claim".into()))
    }

    /// A numeric-date claim (`exp`, `nbf`, `iat`), if present.
    pub fn numeric_claim(&self, name: &str) -> Result<Option<u64>> {
        match self.payload.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| DidError::InvalidToken(format!("{name} must be a numeric date"))),
        }
    }
}

/// Base64url-encode a JSON value.
pub fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Base64url-encode raw bytes.
pub fn encode_bytes(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| DidError::InvalidToken(format!("{what} is not base64url: {e}")))
}

/// Split and decode a token without verifying it.
pub fn decode_token(jwt: &str) -> Result<DecodedToken> {
    let mut parts = jwt.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DidError::InvalidToken(
            "expected three dot-separated segments".into(),
        ));
    };

    let header_json: Header = serde_json::from_slice(&decode_segment(header, "header")?)
        .map_err(|e| DidError::InvalidToken(format!("bad header: {e}")))?;
    let payload_json: Claims = serde_json::from_slice(&decode_segment(payload, "payload")?)
        .map_err(|e| DidError::InvalidToken(format!("bad payload: {e}")))?;

    Ok(DecodedToken {
        header: header_json,
        payload: payload_json,
        signing_input: format!("{header}.{payload}"),
        signature: decode_segment(signature, "signature")?,
    })
}
