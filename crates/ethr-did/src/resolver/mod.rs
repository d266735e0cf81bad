//! Resolution — deriving a DID document from an identity's change log.
//!
//! The resolver provides:
//! - Change-log traversal (newest to oldest, corruption-checked)
//! - Document synthesis as a pure fold over that history
//! - Deterministic delegate/attribute numbering
//! - Attribute name recognition for public keys and services
//!
//! Every call reads the ledger afresh; nothing is cached between calls.

pub mod attribute;
pub mod document;
pub mod history;
pub mod index;
pub mod synthesis;

pub use attribute::{AttributeName, KeyEncoding};
pub use document::{
    AuthenticationRef, DelegateType, Document, KeyMaterial, ResolvedKey, ResolvedService,
};
pub use history::read_history;
pub use synthesis::synthesize;

use std::sync::Arc;

use crate::config::DidConfig;
use crate::error::{DidError, Result};
use crate::identity::{Address, Did};
use crate::ledger::{ChangeRecord, Ledger};

/// Resolves DIDs of one method against a ledger.
pub struct Resolver<L: ?Sized> {
    ledger: Arc<L>,
    method: String,
}

impl<L: ?Sized> Clone for Resolver<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            method: self.method.clone(),
        }
    }
}

impl<L: Ledger + ?Sized> Resolver<L> {
    /// Create a resolver for the default method.
    pub fn new(ledger: Arc<L>) -> Self {
        Self::with_config(ledger, &DidConfig::default())
    }

    /// Create a resolver using the method from `config`.
    pub fn with_config(ledger: Arc<L>, config: &DidConfig) -> Self {
        Self {
            ledger,
            method: config.method.clone(),
        }
    }

    /// The ledger this resolver reads.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// The DID of an identity address under this resolver's method.
    pub fn did_for(&self, address: Address) -> Did {
        Did::with_method(&self.method, address)
    }

    /// Resolve a DID to its current document.
    pub async fn resolve(&self, did: &Did) -> Result<Document> {
        let now = self.ledger.current_instant().await?;
        self.resolve_at(did, now).await
    }

    /// Resolve a DID as of ledger instant `now`.
    ///
    /// Reads the full history afresh; only the validity filter uses `now`.
    pub async fn resolve_at(&self, did: &Did, now: u64) -> Result<Document> {
        if did.method() != self.method {
            return Err(DidError::InvalidDid(format!(
                "unsupported method {:?} (expected {:?})",
                did.method(),
                self.method
            )));
        }
        let history = read_history(self.ledger.as_ref(), &did.address()).await?;
        let document = synthesize(did, &history, now);
        log::debug!(
            "resolved {did} at {} from {} change(s): {} key(s), {} service(s)",
            crate::time::secs_to_rfc3339(now),
            history.len(),
            document.public_key.len(),
            document.service.len()
        );
        Ok(document)
    }

    /// Resolve a DID given as text.
    pub async fn resolve_str(&self, did: &str) -> Result<Document> {
        self.resolve(&did.parse()?).await
    }

    /// Resolve the document of an identity address.
    pub async fn resolve_address(&self, address: &Address) -> Result<Document> {
        self.resolve(&self.did_for(*address)).await
    }

    /// The current owner of an identity.
    pub async fn lookup_owner(&self, address: &Address) -> Result<Address> {
        let history = read_history(self.ledger.as_ref(), address).await?;
        Ok(synthesis::current_owner(*address, &history))
    }

    /// The identity's complete change history, most recent first.
    pub async fn history(&self, address: &Address) -> Result<Vec<ChangeRecord>> {
        read_history(self.ledger.as_ref(), address).await
    }
}
