//! `UntrustedToken` and the token header.

use serde_json::{Map, Value};
use smallvec::SmallVec;

use core::convert::TryFrom;

use crate::{
    alg::AlgorithmId, base64url, Claims, KeyResolutionError, ParseError, Segment,
    ValidationError,
};

/// Maximum "reasonable" signature size in bytes that is stored inline.
const SIGNATURE_SIZE: usize = 64;

/// Optional fields of a JWT header supplied when creating a token.
///
/// `typ` and `alg` are always set by the codec; if `other_fields` contain fields with
/// the same names, they are overwritten in place (i.e., the field order is retained).
///
/// ```
/// # use wp_jwt_codec::Header;
/// let header = Header::default()
///     .with_key_id("k2")
///     .with_field("cty", "application/json");
/// # assert_eq!(header.key_id.as_deref(), Some("k2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct Header {
    /// Identifier of the key that has signed the token. Serialized as [`kid`].
    ///
    /// [`kid`]: https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.4
    pub key_id: Option<String>,
    /// Other header fields, in the order they should appear in the token.
    pub other_fields: Map<String, Value>,
}

impl Header {
    /// Sets the `key_id` field for this header.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Adds an extra field to this header.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other_fields.insert(name.into(), value.into());
        self
    }

    /// Produces the JSON object for the header of a token signed with `algorithm`.
    pub(crate) fn complete(&self, algorithm: AlgorithmId) -> Map<String, Value> {
        let mut fields = self.other_fields.clone();
        fields.insert("typ".to_owned(), Value::from("JWT"));
        fields.insert("alg".to_owned(), Value::from(algorithm.as_str()));
        if let Some(key_id) = &self.key_id {
            fields.insert("kid".to_owned(), Value::from(key_id.as_str()));
        }
        fields
    }
}

/// Parsed, but unvalidated token.
///
/// Useful to inspect the header (e.g., to pick a verifying key) before
/// [decoding](crate::TokenCodec::decode()) the token. Nothing returned by this type
/// should be trusted.
///
/// ```
/// # use wp_jwt_codec::{prelude::*, Header};
/// # fn main() -> anyhow::Result<()> {
/// # let codec = TokenCodec::default();
/// # let token_string = codec.encode_with(
/// #     &Claims::new(), b"secret", AlgorithmId::Hs384, &Header::default().with_key_id("k1"),
/// # )?;
/// let token = UntrustedToken::new(&token_string)?;
/// assert_eq!(token.algorithm(), Some("HS384"));
/// assert_eq!(token.key_id()?, Some("k1"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UntrustedToken<'a> {
    signed_data: &'a str,
    header: Map<String, Value>,
    claims: Claims,
    signature: SmallVec<[u8; SIGNATURE_SIZE]>,
}

fn decode_object(segment: Segment, encoded: &str) -> Result<Map<String, Value>, ParseError> {
    let bytes =
        base64url::decode(encoded).map_err(|_| ParseError::InvalidBase64Encoding(segment))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|err| match segment {
        Segment::Header => ParseError::MalformedHeader(err),
        _ => ParseError::MalformedClaims(err),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ if segment == Segment::Header => Err(ParseError::HeaderNotAnObject),
        _ => Err(ParseError::ClaimsNotAnObject),
    }
}

impl<'a> TryFrom<&'a str> for UntrustedToken<'a> {
    type Error = ParseError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        let token_parts: Vec<_> = s.splitn(4, '.').collect();
        match &token_parts[..] {
            [header, claims, signature] => {
                let header_map = decode_object(Segment::Header, header)?;
                let claims_map = decode_object(Segment::Claims, claims)?;
                let signature = base64url::decode(signature)
                    .map_err(|_| ParseError::InvalidBase64Encoding(Segment::Signature))?;

                Ok(Self {
                    signed_data: &s[..header.len() + 1 + claims.len()],
                    header: header_map,
                    claims: Claims::from(claims_map),
                    signature: SmallVec::from_vec(signature),
                })
            }
            _ => Err(ParseError::InvalidTokenStructure),
        }
    }
}

impl<'a> UntrustedToken<'a> {
    /// Creates an untrusted token from a string. This is a shortcut for calling the [`TryFrom`]
    /// conversion.
    pub fn new<S: AsRef<str> + ?Sized>(s: &'a S) -> Result<Self, ParseError> {
        Self::try_from(s.as_ref())
    }

    /// Gets the token header as a JSON object.
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// Gets the `alg` field of the header if it is a string.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// Gets the `kid` field of the header. A `kid` that is not a string is an error.
    pub fn key_id(&self) -> Result<Option<&str>, KeyResolutionError> {
        match self.header.get("kid") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(key_id)) => Ok(Some(key_id.as_str())),
            Some(_) => Err(KeyResolutionError::InvalidKeyId),
        }
    }

    /// Returns signature bytes from the token. These bytes are **not** guaranteed to form a valid
    /// signature.
    pub fn signature_bytes(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the claims without checking the signature or the time-related claims.
    pub fn claims_unchecked(&self) -> &Claims {
        &self.claims
    }

    /// Returns the data covered by the signature: the encoded header and claims separated
    /// by a period.
    pub(crate) fn signed_data(&self) -> &'a str {
        self.signed_data
    }

    pub(crate) fn into_claims(self) -> Claims {
        self.claims
    }

    /// Resolves the `alg` header field into a supported algorithm.
    pub(crate) fn algorithm_id(&self) -> Result<AlgorithmId, ValidationError> {
        let name = match self.header.get("alg") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                return Err(ValidationError::MissingAlgorithm)
            }
            Some(Value::String(name)) if name.is_empty() => {
                return Err(ValidationError::MissingAlgorithm)
            }
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };
        AlgorithmId::from_name(&name).ok_or(ValidationError::UnsupportedAlgorithm(name))
    }
}
