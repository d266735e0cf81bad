//! Signed tokens — compact JWS assertions issued by a DID.
//!
//! A token binds a claim set to its issuer DID. Signing uses the key the
//! caller configured (owner or delegate); verification resolves the
//! issuer's current document and accepts the token only if one of the
//! document's live keys produced the signature.

pub mod jwt;
pub mod sign;
pub mod verify;

pub use jwt::{decode_token, Algorithm, Claims, DecodedToken, Header};
pub use sign::{sign_token, SignOptions, SigningCapability};
pub use verify::{verify_token, VerifiedToken, VerifyOptions};
