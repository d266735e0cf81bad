//! Identity controller — the write side of one identity.
//!
//! The controller turns owner, delegate and attribute intents into ledger
//! changes and holds the optional signing key used for tokens. Writes from
//! one controller are issued one at a time; each waits for the ledger to
//! accept it before the next starts.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::Mutex;

use crate::config::DidConfig;
use crate::crypto::Secp256k1KeyPair;
use crate::error::{DidError, Result};
use crate::identity::{Address, Did};
use crate::ledger::{Change, ChangeHandle, Ledger};
use crate::resolver::{AttributeName, DelegateType, Document, Resolver};
use crate::time::secs_to_rfc3339;
use crate::token::{self, Claims, SignOptions, SigningCapability, VerifiedToken, VerifyOptions};

/// Value of an attribute write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Text. Under a base64 public key name the text is base64; otherwise
    /// `0x` followed only by hex digits is hex, and anything else is stored
    /// as UTF-8.
    Text(String),
    /// Raw bytes, stored as-is.
    Bytes(Vec<u8>),
}

impl AttributeValue {
    /// The bytes stored on the ledger for this value under `name`.
    pub fn encode(&self, name: &str) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Text(text) => {
                // Base64 text may itself start with "0x".
                if AttributeName::parse(name).is_some_and(|n| n.expects_base64()) {
                    return STANDARD.decode(text).map_err(|e| {
                        DidError::InvalidAttribute(format!("{name}: bad base64 value: {e}"))
                    });
                }
                match hex_digits(text) {
                    Some(digits) => hex::decode(digits).map_err(|e| {
                        DidError::InvalidAttribute(format!("{name}: bad hex value: {e}"))
                    }),
                    None => Ok(text.as_bytes().to_vec()),
                }
            }
        }
    }
}

/// The digits of `0x<hex>` text, or `None` if the text is not entirely hex.
fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x")
        .filter(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for AttributeValue {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Options for [`IdentityController::add_delegate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DelegateOptions {
    pub delegate_type: DelegateType,
    /// Seconds from the ledger's current instant. Defaults to the configured validity.
    pub expires_in: Option<u64>,
}

/// Controls one identity on a ledger.
pub struct IdentityController<L: ?Sized> {
    address: Address,
    did: Did,
    resolver: Resolver<L>,
    config: DidConfig,
    signer: Mutex<Option<SigningCapability>>,
    writes: Mutex<()>,
}

impl<L: Ledger + ?Sized> IdentityController<L> {
    /// Controller for `address` with the default configuration and no signer.
    pub fn new(address: Address, ledger: Arc<L>) -> Self {
        Self::with_config(address, ledger, DidConfig::default())
    }

    /// Controller for `address` with an explicit configuration.
    pub fn with_config(address: Address, ledger: Arc<L>, config: DidConfig) -> Self {
        Self {
            address,
            did: Did::with_method(&config.method, address),
            resolver: Resolver::with_config(ledger, &config),
            config,
            signer: Mutex::new(None),
            writes: Mutex::new(()),
        }
    }

    /// Controller for the identity a key pair controls, signing with that key.
    pub fn from_key_pair(key_pair: Secp256k1KeyPair, ledger: Arc<L>) -> Self {
        Self::new(key_pair.address(), ledger).with_signer(key_pair)
    }

    /// Install a signer.
    pub fn with_signer(mut self, signer: impl Into<SigningCapability>) -> Self {
        *self.signer.get_mut() = Some(signer.into());
        self
    }

    /// Replace the signer of a shared controller.
    pub async fn set_signer(&self, signer: impl Into<SigningCapability>) {
        *self.signer.lock().await = Some(signer.into());
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn config(&self) -> &DidConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver<L> {
        &self.resolver
    }

    /// The identity's current owner.
    pub async fn lookup_owner(&self) -> Result<Address> {
        self.resolver.lookup_owner(&self.address).await
    }

    /// The identity's current document.
    pub async fn resolve_document(&self) -> Result<Document> {
        self.resolver.resolve(&self.did).await
    }

    /// Transfer ownership of the identity.
    pub async fn change_owner(&self, new_owner: Address) -> Result<ChangeHandle> {
        let _guard = self.writes.lock().await;
        let handle = self
            .ledger()
            .submit_change(&self.address, Change::OwnerChanged { owner: new_owner }, 0)
            .await?;
        log::debug!("{}: owner changed to {new_owner} ({handle})", self.did);
        Ok(handle)
    }

    /// Grant `delegate` a delegate role until `expires_in` seconds from now.
    pub async fn add_delegate(
        &self,
        delegate: Address,
        options: DelegateOptions,
    ) -> Result<ChangeHandle> {
        let _guard = self.writes.lock().await;
        let valid_to = self.expiry(options.expires_in).await?;
        let handle = self
            .ledger()
            .submit_change(
                &self.address,
                Change::DelegateChanged {
                    delegate_type: options.delegate_type.as_str().to_string(),
                    delegate,
                },
                valid_to,
            )
            .await?;
        log::debug!(
            "{}: added {} delegate {delegate} until {} ({handle})",
            self.did,
            options.delegate_type.as_str(),
            secs_to_rfc3339(valid_to)
        );
        Ok(handle)
    }

    /// Revoke a delegate role. Takes effect at the ledger's current instant.
    pub async fn revoke_delegate(
        &self,
        delegate: Address,
        delegate_type: DelegateType,
    ) -> Result<ChangeHandle> {
        let _guard = self.writes.lock().await;
        let handle = self
            .ledger()
            .submit_change(
                &self.address,
                Change::DelegateChanged {
                    delegate_type: delegate_type.as_str().to_string(),
                    delegate,
                },
                0,
            )
            .await?;
        log::debug!(
            "{}: revoked {} delegate {delegate} ({handle})",
            self.did,
            delegate_type.as_str()
        );
        Ok(handle)
    }

    /// Set an attribute until `expires_in` seconds from now.
    pub async fn set_attribute(
        &self,
        name: &str,
        value: impl Into<AttributeValue>,
        expires_in: Option<u64>,
    ) -> Result<ChangeHandle> {
        let value = encode_attribute(name, value.into())?;
        let _guard = self.writes.lock().await;
        let valid_to = self.expiry(expires_in).await?;
        let handle = self
            .ledger()
            .submit_change(
                &self.address,
                Change::AttributeChanged {
                    name: name.to_string(),
                    value,
                },
                valid_to,
            )
            .await?;
        log::debug!(
            "{}: set attribute {name} until {} ({handle})",
            self.did,
            secs_to_rfc3339(valid_to)
        );
        Ok(handle)
    }

    /// Revoke an attribute. `value` must encode to the value that was set.
    pub async fn revoke_attribute(
        &self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<ChangeHandle> {
        let value = encode_attribute(name, value.into())?;
        let _guard = self.writes.lock().await;
        let handle = self
            .ledger()
            .submit_change(
                &self.address,
                Change::AttributeChanged {
                    name: name.to_string(),
                    value,
                },
                0,
            )
            .await?;
        log::debug!("{}: revoked attribute {name} ({handle})", self.did);
        Ok(handle)
    }

    /// Generate a fresh key, add it as a delegate and sign with it from now on.
    ///
    /// Returns the generated key pair so the caller can persist it.
    pub async fn create_signing_delegate(
        &self,
        delegate_type: DelegateType,
        expires_in: Option<u64>,
    ) -> Result<Secp256k1KeyPair> {
        let key_pair = Secp256k1KeyPair::generate();
        self.add_delegate(
            key_pair.address(),
            DelegateOptions {
                delegate_type,
                expires_in,
            },
        )
        .await?;
        self.set_signer(key_pair.clone()).await;
        Ok(key_pair)
    }

    /// Sign `claims` as this identity.
    ///
    /// Without an explicit lifetime, the configured token lifetime applies.
    pub async fn sign_token(&self, claims: Claims, options: SignOptions) -> Result<String> {
        let options = SignOptions {
            expires_in: options
                .expires_in
                .or(self.config.default_token_lifetime_secs),
            ..options
        };
        let signer = self.signer.lock().await;
        let issued_at = self.ledger().current_instant().await?;
        token::sign_token(&self.did, signer.as_ref(), claims, &options, issued_at)
    }

    /// Verify a token addressed to this identity (or to no one).
    pub async fn verify_token(&self, jwt: &str) -> Result<VerifiedToken> {
        self.verify_token_with(jwt, false).await
    }

    /// Verify a token, optionally only accepting authentication keys.
    pub async fn verify_token_with(&self, jwt: &str, auth: bool) -> Result<VerifiedToken> {
        let options = VerifyOptions {
            audience: Some(self.did.clone()),
            auth,
        };
        token::verify_token(&self.resolver, jwt, &options).await
    }

    fn ledger(&self) -> &L {
        self.resolver.ledger().as_ref()
    }

    async fn expiry(&self, expires_in: Option<u64>) -> Result<u64> {
        let now = self.ledger().current_instant().await?;
        Ok(now.saturating_add(expires_in.unwrap_or(self.config.default_validity_secs)))
    }
}

fn encode_attribute(name: &str, value: AttributeValue) -> Result<Vec<u8>> {
    if name.is_empty() {
        return Err(DidError::InvalidAttribute("empty attribute name".into()));
    }
    value.encode(name)
}
