//! The synthesized DID document and its JSON shape.
//!
//! ```json
//! {
//!   "@context": "https://w3id.org/did/v1",
//!   "id": "did:ethr:0x…",
//!   "publicKey": [{ "id": "did:ethr:0x…#owner", "type": "Secp256k1VerificationKey2018",
//!                   "owner": "did:ethr:0x…", "ethereumAddress": "0x…" }],
//!   "authentication": [{ "type": "Secp256k1SignatureAuthentication2018",
//!                        "publicKey": "did:ethr:0x…#owner" }],
//!   "service": [{ "type": "HubService", "serviceEndpoint": "https://…" }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::identity::{Address, Did};

/// JSON-LD context of every document.
pub const DID_CONTEXT: &str = "https://w3id.org/did/v1";

/// Key type of the owner entry and of address delegates.
pub const SECP256K1_VERIFICATION_KEY: &str = "Secp256k1VerificationKey2018";

/// Delegate type (and authentication entry type) for signature authentication.
pub const SECP256K1_SIGNATURE_AUTHENTICATION: &str = "Secp256k1SignatureAuthentication2018";

/// Key type for Ed25519 public keys published as attributes.
pub const ED25519_VERIFICATION_KEY: &str = "Ed25519VerificationKey2018";

/// Delegate types understood by resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelegateType {
    /// General signing key (`veriKey`).
    #[default]
    VerificationKey,
    /// Signing key that may also authenticate (`sigAuth`).
    SignatureAuthentication,
}

impl DelegateType {
    /// Return the on-ledger type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationKey => SECP256K1_VERIFICATION_KEY,
            Self::SignatureAuthentication => SECP256K1_SIGNATURE_AUTHENTICATION,
        }
    }

    /// Parse an on-ledger type name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            SECP256K1_VERIFICATION_KEY | "veriKey" => Some(Self::VerificationKey),
            SECP256K1_SIGNATURE_AUTHENTICATION | "sigAuth" => Some(Self::SignatureAuthentication),
            _ => None,
        }
    }

    /// Whether delegates of this type appear under `authentication`.
    pub fn authenticates(&self) -> bool {
        matches!(self, Self::SignatureAuthentication)
    }
}

/// Key material of a public key entry. Exactly one form per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyMaterial {
    /// A ledger account address.
    EthereumAddress(Address),
    /// Raw public key bytes, rendered as hex.
    PublicKeyHex(#[serde(with = "hex_bytes")] Vec<u8>),
    /// Raw public key bytes, rendered as base64.
    PublicKeyBase64(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl KeyMaterial {
    /// The underlying key bytes, if this is not an address.
    pub fn key_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::EthereumAddress(_) => None,
            Self::PublicKeyHex(bytes) | Self::PublicKeyBase64(bytes) => Some(bytes),
        }
    }
}

/// A currently valid key entry of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedKey {
    /// DID URL of this entry (`<did>#owner`, `<did>#delegate-<n>`).
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    /// DID of the document this key belongs to.
    pub owner: Did,
    #[serde(flatten)]
    pub material: KeyMaterial,
}

impl ResolvedKey {
    /// The local identifier (fragment) of this entry.
    pub fn local_id(&self) -> &str {
        self.id.rsplit_once('#').map(|(_, f)| f).unwrap_or(&self.id)
    }
}

/// Reference from `authentication` into `publicKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationRef {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// A service endpoint entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: String,
}

/// A point-in-time DID document. Built fresh per resolution, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: String,
    pub id: Did,
    #[serde(rename = "publicKey")]
    pub public_key: Vec<ResolvedKey>,
    pub authentication: Vec<AuthenticationRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<ResolvedService>,
}

impl Document {
    /// The owner entry. Always present and always first.
    pub fn owner_key(&self) -> Option<&ResolvedKey> {
        self.public_key.first()
    }

    /// Find a key entry by its local identifier.
    pub fn key(&self, local_id: &str) -> Option<&ResolvedKey> {
        self.public_key.iter().find(|k| k.local_id() == local_id)
    }

    /// Key entries referenced from `authentication`, in reference order.
    pub fn authentication_keys(&self) -> Vec<&ResolvedKey> {
        self.authentication
            .iter()
            .filter_map(|auth| self.public_key.iter().find(|k| k.id == auth.public_key))
            .collect()
    }

    /// Serialize to the canonical JSON shape.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
