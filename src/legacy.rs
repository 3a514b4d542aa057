//! Compatibility signer used by the token exchange hook of the login integration.
//!
//! Tokens produced here are plain HS256 tokens with the fixed `{"typ":"JWT","alg":"HS256"}`
//! header. They can be verified by [`TokenCodec`](crate::TokenCodec) as usual.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use core::fmt;

use crate::{
    alg::{Algorithm, Hs256},
    base64url, CreationError,
};

/// Header of legacy tokens, in the field order it is serialized in.
pub const LEGACY_HEADER: &str = r#"{"typ":"JWT","alg":"HS256"}"#;

/// Signs `payload` with HS256 using the fixed [`LEGACY_HEADER`].
///
/// # Examples
///
/// ```
/// # use serde_json::json;
/// # use wp_jwt_codec::{legacy, AlgorithmId, Key, TokenCodec};
/// # fn main() -> anyhow::Result<()> {
/// let token = legacy::signed_token("secret", &json!({ "UserID": 7 }))?;
/// assert!(token.starts_with("eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9."));
/// let claims = TokenCodec::default()
///     .decode(&token, &Key::single("secret"), &[AlgorithmId::Hs256])?;
/// assert_eq!(claims["UserID"], 7);
/// # Ok(())
/// # }
/// ```
pub fn signed_token<T>(secret: impl AsRef<[u8]>, payload: &T) -> Result<String, CreationError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(payload).map_err(CreationError::Claims)?;
    let mut buffer = base64url::encode(LEGACY_HEADER);
    buffer.push('.');
    base64url::encode_buf(&payload, &mut buffer);

    let signature = Hs256
        .sign(secret.as_ref(), buffer.as_bytes())
        .map_err(CreationError::Signing)?;
    buffer.push('.');
    base64url::encode_buf(signature, &mut buffer);
    Ok(buffer)
}

/// Settings of the login integration, stored by it as a JSON object.
///
/// Only `decryption_key` is interpreted; other settings are retained as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginSettings {
    /// Secret used to sign exchanged tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decryption_key: Option<String>,
    /// Other settings.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl LoginSettings {
    /// Parses settings from their JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns the signing secret, or `None` if it is absent or empty.
    pub fn decryption_key(&self) -> Option<&str> {
        self.decryption_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Payload of exchanged tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPayload {
    /// Token issuer.
    pub iss: String,
    /// Issuance timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Token subject.
    pub sub: String,
    /// Subject name.
    pub name: String,
    /// ID of the user the token is exchanged for.
    #[serde(rename = "UserID")]
    pub user_id: u64,
}

impl LegacyPayload {
    /// Payload emitted by the exchange hook. All fields except `UserID` are the hardcoded
    /// placeholder values consumers of exchanged tokens currently expect; in particular,
    /// `exp` lies in the past, so these tokens fail expiration checks of a strict decoder.
    pub fn demo(user_id: u64) -> Self {
        Self {
            iss: "Online JWT Builder".to_owned(),
            iat: 1_620_838_287,
            exp: 1_652_425_079,
            sub: "1234567890".to_owned(),
            name: "John Doe".to_owned(),
            user_id,
        }
    }
}

/// Errors that can occur during token exchange.
#[derive(Debug)]
#[non_exhaustive]
pub enum ExchangeError {
    /// Login settings do not contain a signing secret.
    MissingDecryptionKey,
    /// Token cannot be created.
    Creation(CreationError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDecryptionKey => {
                formatter.write_str("login settings do not specify `decryption_key`")
            }
            Self::Creation(e) => write!(formatter, "cannot create exchanged token: {e}"),
        }
    }
}

impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Creation(e) => Some(e),
            Self::MissingDecryptionKey => None,
        }
    }
}

impl From<CreationError> for ExchangeError {
    fn from(error: CreationError) -> Self {
        Self::Creation(error)
    }
}

/// Creates the token returned by the exchange hook for the specified user.
pub fn exchange_token(settings: &LoginSettings, user_id: u64) -> Result<String, ExchangeError> {
    let key = settings.decryption_key().ok_or_else(|| {
        tracing::warn!(user_id, "Token exchange requested without a signing secret");
        ExchangeError::MissingDecryptionKey
    })?;
    let token = signed_token(key, &LegacyPayload::demo(user_id))?;
    tracing::debug!(user_id, "Exchanged token");
    Ok(token)
}
