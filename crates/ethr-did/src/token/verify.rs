//! Token verification against the issuer's resolved document.

use k256::ecdsa::VerifyingKey;

use crate::crypto::address_from_verifying_key;
use crate::crypto::signing::{recover, verify_ed25519};
use crate::crypto::Ed25519KeyPair;
use crate::error::{DidError, Result};
use crate::identity::{Address, Did};
use crate::ledger::Ledger;
use crate::resolver::{Document, KeyMaterial, ResolvedKey, Resolver};

use super::jwt::{decode_token, Algorithm, Claims, DecodedToken};

/// Options for [`verify_token`].
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// The verifying party. Required when the token names an audience.
    pub audience: Option<Did>,
    /// Only accept keys referenced from the document's `authentication`.
    pub auth: bool,
}

/// A token whose signature and claims checked out.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub payload: Claims,
    pub issuer: Did,
    /// The document entry whose key produced the signature.
    pub signer: ResolvedKey,
    pub jwt: String,
}

/// Verify a token.
///
/// Reads the ledger's current instant once, resolves the issuer's document
/// at that instant and looks for a live key that produced the signature.
/// Time claims (`exp`, `nbf`) are checked against the same instant, then
/// the audience.
pub async fn verify_token<L: Ledger + ?Sized>(
    resolver: &Resolver<L>,
    jwt: &str,
    options: &VerifyOptions,
) -> Result<VerifiedToken> {
    let decoded = decode_token(jwt)?;
    let algorithm = decoded.algorithm()?;
    let issuer: Did = decoded.issuer()?.parse()?;

    // One instant for both key validity and the time claims.
    let now = resolver.ledger().current_instant().await?;
    let document = resolver.resolve_at(&issuer, now).await?;
    let signer = find_signer(&document, &decoded, algorithm, options.auth)?
        .ok_or_else(|| DidError::NoMatchingKey {
            issuer: issuer.to_string(),
        })?
        .clone();
    log::debug!("{issuer} token signed by {}", signer.id);

    if let Some(exp) = decoded.numeric_claim("exp")? {
        if exp <= now {
            return Err(DidError::TokenExpired { exp, now });
        }
    }
    if let Some(nbf) = decoded.numeric_claim("nbf")? {
        if nbf > now {
            return Err(DidError::TokenNotYetValid { nbf, now });
        }
    }

    check_audience(&decoded.payload, options.audience.as_ref())?;

    Ok(VerifiedToken {
        payload: decoded.payload,
        issuer,
        signer,
        jwt: jwt.to_string(),
    })
}

fn check_audience(payload: &Claims, verifier: Option<&Did>) -> Result<()> {
    let Some(aud) = payload.get("aud") else {
        return Ok(());
    };
    let audience = aud
        .as_str()
        .ok_or_else(|| DidError::InvalidToken("aud must be a string".into()))?;
    let verifier = verifier.ok_or(DidError::AudienceRequired)?;
    if audience != verifier.to_string() {
        return Err(DidError::AudienceMismatch {
            audience: audience.to_string(),
            verifier: verifier.to_string(),
        });
    }
    Ok(())
}

fn find_signer<'a>(
    document: &'a Document,
    token: &DecodedToken,
    algorithm: Algorithm,
    auth_only: bool,
) -> Result<Option<&'a ResolvedKey>> {
    let candidates: Vec<&ResolvedKey> = if auth_only {
        document.authentication_keys()
    } else {
        document.public_key.iter().collect()
    };
    let message = token.signing_input.as_bytes();

    match algorithm {
        Algorithm::Es256kR => {
            let recovered = recover(message, &token.signature)?;
            let address = address_from_verifying_key(&recovered);
            Ok(candidates
                .into_iter()
                .find(|key| matches_secp256k1(key, &recovered, address)))
        }
        Algorithm::Ed25519 => Ok(candidates.into_iter().find(|key| {
            is_ed25519(key)
                && key
                    .material
                    .key_bytes()
                    .and_then(|bytes| Ed25519KeyPair::verifying_key_from_slice(bytes).ok())
                    .is_some_and(|vk| verify_ed25519(&vk, message, &token.signature).is_ok())
        })),
    }
}

fn matches_secp256k1(key: &ResolvedKey, recovered: &VerifyingKey, address: Address) -> bool {
    match &key.material {
        KeyMaterial::EthereumAddress(candidate) => *candidate == address,
        KeyMaterial::PublicKeyHex(bytes) | KeyMaterial::PublicKeyBase64(bytes) => {
            key.key_type.starts_with("Secp256k1")
                && VerifyingKey::from_sec1_bytes(bytes).is_ok_and(|vk| vk == *recovered)
        }
    }
}

fn is_ed25519(key: &ResolvedKey) -> bool {
    key.key_type.starts_with("Ed25519")
}
