//! Attribute names recognized by resolution.
//!
//! - `did/publicKey/<KeyType>[/<encoding>]` publishes a public key. The
//!   encoding is `publicKeyHex` (default) or `publicKeyBase64`; the short
//!   forms `hex` and `base64` are accepted too.
//! - `did/service/<ServiceType>` publishes a service endpoint whose value is
//!   the UTF-8 endpoint URI.
//!
//! Anything else is not part of the document and is skipped.

use super::document::KeyMaterial;

/// How an attribute public key is rendered in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    Hex,
    Base64,
}

impl KeyEncoding {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "publicKeyHex" | "hex" => Some(Self::Hex),
            "publicKeyBase64" | "base64" => Some(Self::Base64),
            _ => None,
        }
    }

    /// Wrap raw key bytes in the matching material variant.
    pub fn material(&self, bytes: Vec<u8>) -> KeyMaterial {
        match self {
            Self::Hex => KeyMaterial::PublicKeyHex(bytes),
            Self::Base64 => KeyMaterial::PublicKeyBase64(bytes),
        }
    }
}

/// A recognized attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeName {
    PublicKey {
        key_type: String,
        encoding: KeyEncoding,
    },
    Service {
        service_type: String,
    },
}

impl AttributeName {
    /// Parse an attribute name. Unrecognized names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('/').collect();
        match parts.as_slice() {
            ["did", "publicKey", key_type] if is_type_name(key_type) => Some(Self::PublicKey {
                key_type: key_type.to_string(),
                encoding: KeyEncoding::Hex,
            }),
            ["did", "publicKey", key_type, encoding] if is_type_name(key_type) => {
                Some(Self::PublicKey {
                    key_type: key_type.to_string(),
                    encoding: KeyEncoding::parse(encoding)?,
                })
            }
            ["did", "service", service_type] if is_type_name(service_type) => Some(Self::Service {
                service_type: service_type.to_string(),
            }),
            _ => None,
        }
    }

    /// Whether values under this name are base64 text when given as strings.
    pub fn expects_base64(&self) -> bool {
        matches!(
            self,
            Self::PublicKey {
                encoding: KeyEncoding::Base64,
                ..
            }
        )
    }
}

fn is_type_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
