//! [JSON web token (JWT)][JWT] engine: token creation, decoding, and validation with
//! `HS*` and `RS*` algorithms selected at runtime.
//!
//! # Design choices
//!
//! - Algorithms are looked up by the `alg` header field in a fixed registry
//!   ([`AlgorithmId`]). Decoding requires an explicit allow-list of algorithms, which is checked
//!   *before* the signature is verified; this rules out [algorithm switching attacks][switching].
//!   The `none` algorithm is never supported.
//! - Keys are opaque byte sequences: an HMAC secret, or a PEM / DER encoded RSA key.
//!   A verifying [`Key`] may be a key set indexed by the `kid` header field.
//! - Claims are an open JSON object ([`Claims`]). `nbf`, `iat` and `exp` claims are validated
//!   against the current time with the configurable leeway ([`TimeOptions`]).
//! - Every failure is reported as a typed error; [`ErrorKind`] provides a flat classification
//!   suitable for mapping to HTTP responses.
//!
//! ## Supported algorithms
//!
//! | Algorithm(s) | Description |
//! |--------------|-------------|
//! | `HS256`, `HS384`, `HS512` | HMAC with the pure Rust [`sha2`] crate |
//! | `RS256`, `RS384`, `RS512` | RSA PKCS#1 v1.5 with the pure Rust [`rsa`] crate (blinded) |
//!
//! [JWT]: https://jwt.io/
//! [switching]: https://auth0.com/blog/critical-vulnerabilities-in-json-web-token-libraries/
//! [`sha2`]: https://docs.rs/sha2/
//! [`rsa`]: https://docs.rs/rsa/
//!
//! # Examples
//!
//! Basic JWT lifecycle:
//!
//! ```
//! use chrono::Duration;
//! use wp_jwt_codec::{prelude::*, Header};
//! use serde::{Deserialize, Serialize};
//!
//! /// Custom claims encoded in the token.
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct CustomClaims {
//!     #[serde(rename = "sub")]
//!     subject: String,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! // Choose time-related options for token creation / validation.
//! let codec = TokenCodec::new(TimeOptions::from_leeway(Duration::seconds(30)));
//! // Create a token.
//! let claims = Claims::new()
//!     .with("sub", "alice")
//!     .set_duration_and_issuance(codec.time_options(), Duration::days(7));
//! let header = Header::default().with_key_id("my-key");
//! let token_string = codec.encode_with(&claims, "super_secret_key", AlgorithmId::Hs256, &header)?;
//!
//! // Before decoding the token, we might inspect its header.
//! let token = UntrustedToken::new(&token_string)?;
//! assert_eq!(token.key_id()?, Some("my-key"));
//!
//! // Decode and validate the token.
//! let key = Key::from_iter([("my-key", "super_secret_key"), ("old-key", "old_secret")]);
//! let claims = codec.decode(&token_string, &key, &[AlgorithmId::Hs256])?;
//! let custom: CustomClaims = claims.deserialize_into()?;
//! assert_eq!(custom.subject, "alice");
//! # Ok(())
//! # } // end main()
//! ```
//!
//! ## RSA keys
//!
//! ```
//! # use wp_jwt_codec::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! # let (private_key_pem, public_key_pem) = (
//! #     include_str!("../tests/keys/rsa_private.pem"),
//! #     include_str!("../tests/keys/rsa_public.pem"),
//! # );
//! let codec = TokenCodec::default();
//! let claims = Claims::new().with("sub", "42");
//! let token = codec.encode(&claims, private_key_pem, AlgorithmId::Rs256)?;
//! let allowed = [AlgorithmId::Rs256, AlgorithmId::Rs384, AlgorithmId::Rs512];
//! let decoded = codec.decode(&token, &Key::single(public_key_pem), &allowed)?;
//! assert_eq!(decoded, claims);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/wp-jwt-codec/0.2.0")]
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod alg;
pub mod base64url;
mod claims;
mod codec;
mod config;
mod error;
mod key;
pub mod legacy;
mod token;

/// Prelude to neatly import all necessary stuff from the crate.
pub mod prelude {
    pub use crate::{AlgorithmId, Claims, Key, TimeOptions, TokenCodec, UntrustedToken};
}

pub use crate::{
    alg::AlgorithmId,
    claims::{Claims, TimeOptions},
    codec::TokenCodec,
    config::{CodecConfig, ConfigError, ConfiguredCodec},
    error::{
        Claim, CreationError, ErrorKind, KeyResolutionError, ParseError, Segment,
        ValidationError,
    },
    key::Key,
    token::{Header, UntrustedToken},
};
