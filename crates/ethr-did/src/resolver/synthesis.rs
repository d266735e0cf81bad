//! Document synthesis — a pure fold from change history to document.
//!
//! The fold starts from the identity owning itself. The newest owner change
//! decides the owner for good (ownership does not expire). Live delegate
//! and attribute entries then follow in chronological order, numbered by
//! one shared [`KeyIndexer`].

use crate::identity::{Address, Did};
use crate::ledger::{Change, ChangeRecord};

use super::attribute::AttributeName;
use super::document::{
    AuthenticationRef, DelegateType, Document, KeyMaterial, ResolvedKey, ResolvedService,
    DID_CONTEXT, SECP256K1_SIGNATURE_AUTHENTICATION, SECP256K1_VERIFICATION_KEY,
};
use super::index::{live_entries, KeyIndexer, OWNER_FRAGMENT};

/// Accumulated document state.
struct DocumentBuilder {
    did: Did,
    public_key: Vec<ResolvedKey>,
    authentication: Vec<AuthenticationRef>,
    service: Vec<ResolvedService>,
    indexer: KeyIndexer,
}

impl DocumentBuilder {
    /// Initial state: only the owner entry.
    fn new(did: Did, owner: Address) -> Self {
        let mut builder = Self {
            did,
            public_key: Vec::new(),
            authentication: Vec::new(),
            service: Vec::new(),
            indexer: KeyIndexer::new(),
        };
        builder.push_key(
            OWNER_FRAGMENT.to_string(),
            SECP256K1_VERIFICATION_KEY,
            KeyMaterial::EthereumAddress(owner),
            true,
        );
        builder
    }

    fn push_key(
        &mut self,
        fragment: String,
        key_type: &str,
        material: KeyMaterial,
        authenticates: bool,
    ) {
        let id = self.did.url(&fragment);
        if authenticates {
            self.authentication.push(AuthenticationRef {
                auth_type: SECP256K1_SIGNATURE_AUTHENTICATION.to_string(),
                public_key: id.clone(),
            });
        }
        self.public_key.push(ResolvedKey {
            id,
            key_type: key_type.to_string(),
            owner: self.did.clone(),
            material,
        });
    }

    fn apply(&mut self, record: &ChangeRecord) {
        match &record.change {
            Change::OwnerChanged { .. } => {}
            Change::DelegateChanged {
                delegate_type,
                delegate,
            } => {
                let Some(kind) = DelegateType::parse(delegate_type) else {
                    log::trace!("ignoring delegate {delegate} of unknown type {delegate_type:?}");
                    return;
                };
                let fragment = self.indexer.next_id();
                self.push_key(
                    fragment,
                    SECP256K1_VERIFICATION_KEY,
                    KeyMaterial::EthereumAddress(*delegate),
                    kind.authenticates(),
                );
            }
            Change::AttributeChanged { name, value } => match AttributeName::parse(name) {
                Some(AttributeName::PublicKey { key_type, encoding }) => {
                    let fragment = self.indexer.next_id();
                    self.push_key(fragment, &key_type, encoding.material(value.clone()), false);
                }
                Some(AttributeName::Service { service_type }) => {
                    match String::from_utf8(value.clone()) {
                        Ok(endpoint) => self.service.push(ResolvedService {
                            service_type,
                            service_endpoint: endpoint,
                        }),
                        Err(_) => log::trace!("ignoring non-UTF-8 endpoint for {name}"),
                    }
                }
                None => log::trace!("ignoring unrecognized attribute {name:?}"),
            },
        }
    }

    fn build(self) -> Document {
        Document {
            context: DID_CONTEXT.to_string(),
            id: self.did,
            public_key: self.public_key,
            authentication: self.authentication,
            service: self.service,
        }
    }
}

/// The owner after applying `history` (most recent first) to `identity`.
pub fn current_owner(identity: Address, history: &[ChangeRecord]) -> Address {
    history
        .iter()
        .find_map(|record| match record.change {
            Change::OwnerChanged { owner } => Some(owner),
            _ => None,
        })
        .unwrap_or(identity)
}

/// Synthesize the document of `did` at instant `now`.
///
/// `history` must be the identity's complete history, most recent first.
pub fn synthesize(did: &Did, history: &[ChangeRecord], now: u64) -> Document {
    let owner = current_owner(did.address(), history);
    let mut builder = DocumentBuilder::new(did.clone(), owner);
    for record in live_entries(history, now) {
        builder.apply(record);
    }
    builder.build()
}
