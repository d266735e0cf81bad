//! Decentralized identifiers derived from ledger addresses.
//!
//! Format: `did:<method>:<0x-address>`, e.g.
//! `did:ethr:0xf3beac30c498d9e26865f34fcaa57dbb935b0d74`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::DEFAULT_METHOD;
use crate::error::{DidError, Result};

use super::address::Address;

/// A parsed DID naming one ledger identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    address: Address,
}

impl Did {
    /// Create a DID under the default method.
    pub fn new(address: Address) -> Self {
        Self::with_method(DEFAULT_METHOD, address)
    }

    /// Create a DID under an explicit method.
    pub fn with_method(method: &str, address: Address) -> Self {
        Self {
            method: method.to_string(),
            address,
        }
    }

    /// The method segment.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The identity address this DID names.
    pub fn address(&self) -> Address {
        self.address
    }

    /// A DID URL pointing at a fragment inside this DID's document.
    pub fn url(&self, fragment: &str) -> String {
        format!("{self}#{fragment}")
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.address)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self> {
        // Fragments and paths are not part of the identifier.
        let bare = s.split(['#', '?', '/']).next().unwrap_or(s);
        let parts: Vec<&str> = bare.split(':').collect();
        if parts.len() != 3 {
            return Err(DidError::InvalidDid(format!(
                "expected 3 parts, got {}",
                parts.len()
            )));
        }
        if parts[0] != "did" {
            return Err(DidError::InvalidDid("must start with 'did'".into()));
        }
        if parts[1].is_empty() {
            return Err(DidError::InvalidDid("method must not be empty".into()));
        }
        let address = parts[2]
            .parse::<Address>()
            .map_err(|e| DidError::InvalidDid(format!("{s}: {e}")))?;
        Ok(Self {
            method: parts[1].to_string(),
            address,
        })
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
