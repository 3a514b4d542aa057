//! `TokenCodec`: creating tokens and decoding them with full validation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    alg::AlgorithmId, base64url, Claims, CreationError, Header, Key, TimeOptions,
    UntrustedToken, ValidationError,
};

/// Encoder and validating decoder of JWTs.
///
/// The codec holds only [`TimeOptions`], which are never mutated after construction.
/// Key material is supplied with each call, so a single codec may be shared
/// among threads (it is `Send + Sync` if the clock function is).
///
/// # Examples
///
/// ```
/// # use chrono::{Duration, TimeZone, Utc};
/// # use serde_json::json;
/// # use wp_jwt_codec::prelude::*;
/// # fn main() -> anyhow::Result<()> {
/// let now = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
/// let codec = TokenCodec::new(TimeOptions::fixed(now, Duration::zero()));
///
/// let claims = Claims::new().with("sub", "42").with("exp", 2_000_000_000);
/// let token = codec.encode(&claims, "secret", AlgorithmId::Hs256)?;
///
/// let decoded = codec.decode(&token, &Key::single("secret"), &[AlgorithmId::Hs256])?;
/// assert_eq!(decoded, claims);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokenCodec<F = fn() -> DateTime<Utc>> {
    options: TimeOptions<F>,
}

/// Default codec uses the wall clock and zero leeway.
impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(TimeOptions::default())
    }
}

impl<F: Fn() -> DateTime<Utc>> TokenCodec<F> {
    /// Creates a codec with the specified time options.
    pub fn new(options: TimeOptions<F>) -> Self {
        Self { options }
    }

    /// Returns time options used by this codec.
    pub fn time_options(&self) -> &TimeOptions<F> {
        &self.options
    }

    /// Creates a token with the standard header (`typ` and `alg` fields only).
    pub fn encode<T>(
        &self,
        claims: &T,
        signing_key: impl AsRef<[u8]>,
        algorithm: AlgorithmId,
    ) -> Result<String, CreationError>
    where
        T: Serialize + ?Sized,
    {
        self.encode_with(claims, signing_key, algorithm, &Header::default())
    }

    /// Creates a token with an algorithm specified by its JOSE name, e.g. `"HS512"`.
    pub fn encode_with_name<T>(
        &self,
        claims: &T,
        signing_key: impl AsRef<[u8]>,
        algorithm: &str,
        header: &Header,
    ) -> Result<String, CreationError>
    where
        T: Serialize + ?Sized,
    {
        let algorithm = AlgorithmId::from_name(algorithm)
            .ok_or_else(|| CreationError::UnsupportedAlgorithm(algorithm.to_owned()))?;
        self.encode_with(claims, signing_key, algorithm, header)
    }

    /// Creates a token with additional header fields and / or the key ID.
    pub fn encode_with<T>(
        &self,
        claims: &T,
        signing_key: impl AsRef<[u8]>,
        algorithm: AlgorithmId,
        header: &Header,
    ) -> Result<String, CreationError>
    where
        T: Serialize + ?Sized,
    {
        let header_json =
            serde_json::to_string(&header.complete(algorithm)).map_err(CreationError::Header)?;
        let claims_json = serde_json::to_string(claims).map_err(CreationError::Claims)?;

        let mut buffer = String::new();
        base64url::encode_buf(&header_json, &mut buffer);
        buffer.push('.');
        base64url::encode_buf(&claims_json, &mut buffer);

        let signature = algorithm
            .algorithm()
            .sign(signing_key.as_ref(), buffer.as_bytes())
            .map_err(|err| {
                tracing::warn!(alg = %algorithm, error = %err, "Unable to sign token");
                CreationError::Signing(err)
            })?;
        buffer.push('.');
        base64url::encode_buf(&signature, &mut buffer);

        tracing::debug!(alg = %algorithm, kid = ?header.key_id, "Created token");
        Ok(buffer)
    }

    /// Decodes a token and validates it.
    ///
    /// Validation consists of the following steps, the first failing step determining
    /// the returned error:
    ///
    /// 1. The key must not be empty.
    /// 2. The token must be parsed (see [`UntrustedToken`]).
    /// 3. The `alg` header field must be present, supported and contained in
    ///    `allowed_algorithms`.
    /// 4. If `key` is a key set, it must contain the key with the `kid` from the header.
    /// 5. The signature must be valid.
    /// 6. `nbf` and `iat` claims (if present) must not be in the future, and the `exp` claim
    ///    (if present) must be in the future, with the leeway applied to all comparisons.
    ///
    /// The current time is read once at the start of the call.
    pub fn decode(
        &self,
        token: &str,
        key: &Key<'_>,
        allowed_algorithms: &[AlgorithmId],
    ) -> Result<Claims, ValidationError> {
        let now = self.options.now();
        self.decode_at(now, token, key, allowed_algorithms)
            .map_err(|err| {
                tracing::warn!(kind = %err.kind(), error = %err, "Token rejected");
                err
            })
    }

    fn decode_at(
        &self,
        now: DateTime<Utc>,
        token: &str,
        key: &Key<'_>,
        allowed_algorithms: &[AlgorithmId],
    ) -> Result<Claims, ValidationError> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }

        let token = UntrustedToken::new(token)?;
        let algorithm = token.algorithm_id()?;
        if !allowed_algorithms.contains(&algorithm) {
            return Err(ValidationError::AlgorithmNotAllowed(algorithm));
        }

        let key_id = match key {
            Key::Single(_) => None,
            Key::ByKid(_) => token.key_id()?,
        };
        let verifying_key = key.resolve(key_id)?;
        let is_valid = algorithm.algorithm().verify_signature(
            token.signature_bytes(),
            verifying_key,
            token.signed_data().as_bytes(),
        );
        if !is_valid {
            return Err(ValidationError::InvalidSignature);
        }
        tracing::debug!(alg = %algorithm, kid = ?key_id, "Verified token signature");

        let options = TimeOptions::fixed(now, self.options.leeway);
        let claims = token.into_claims();
        claims
            .validate_maturity(&options)?
            .validate_issuance(&options)?
            .validate_expiration(&options)?;
        Ok(claims)
    }
}
