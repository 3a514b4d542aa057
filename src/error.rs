//! Error handling.

use core::fmt;

use crate::alg::AlgorithmId;

/// Coarse classification of codec failures.
///
/// Routing layers are expected to map kinds to HTTP responses (e.g., `Expired` to 401).
/// Both [`ValidationError`] and [`CreationError`] expose their kind via a `kind()` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Token is structurally invalid, or the verifying key is empty.
    MalformedToken,
    /// Token header does not specify an algorithm.
    MissingAlgorithm,
    /// Algorithm is not known to the codec.
    UnsupportedAlgorithm,
    /// Algorithm is known, but excluded by the caller's allow-list.
    AlgorithmNotAllowed,
    /// Verifying key cannot be selected from a key set.
    KeyResolutionFailure,
    /// Token signature is invalid.
    SignatureVerificationFailed,
    /// `nbf` or `iat` claim lies in the future.
    TokenNotYetValid,
    /// `exp` claim lies in the past.
    TokenExpired,
    /// Token cannot be signed or serialized.
    SigningFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::MalformedToken => "malformed token",
            Self::MissingAlgorithm => "missing algorithm",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::AlgorithmNotAllowed => "algorithm not allowed",
            Self::KeyResolutionFailure => "key resolution failure",
            Self::SignatureVerificationFailed => "signature verification failed",
            Self::TokenNotYetValid => "token not yet valid",
            Self::TokenExpired => "token expired",
            Self::SigningFailure => "signing failure",
        })
    }
}

/// Errors that may occur during token parsing.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Token has invalid structure.
    ///
    /// Valid tokens must consist of 3 base64url-encoded parts (header, claims, and signature)
    /// separated by periods.
    InvalidTokenStructure,
    /// Cannot decode base64url in the specified token segment.
    InvalidBase64Encoding(Segment),
    /// Token header cannot be parsed.
    MalformedHeader(serde_json::Error),
    /// Token header is valid JSON, but not a JSON object.
    HeaderNotAnObject,
    /// Token claims cannot be parsed.
    MalformedClaims(serde_json::Error),
    /// Token claims are valid JSON, but not a JSON object.
    ClaimsNotAnObject,
}

/// Segment of a token string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// First segment (header).
    Header,
    /// Second segment (claims).
    Claims,
    /// Third segment (signature).
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Header => "header",
            Self::Claims => "claims",
            Self::Signature => "signature",
        })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTokenStructure => formatter.write_str("Wrong number of segments"),
            Self::InvalidBase64Encoding(segment) => {
                write!(formatter, "Invalid base64url encoding of token {segment}")
            }
            Self::MalformedHeader(e) => write!(formatter, "Malformed token header: {e}"),
            Self::HeaderNotAnObject => formatter.write_str("Token header is not a JSON object"),
            Self::MalformedClaims(e) => write!(formatter, "Malformed token claims: {e}"),
            Self::ClaimsNotAnObject => formatter.write_str("Token claims are not a JSON object"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedHeader(e) | Self::MalformedClaims(e) => Some(e),
            _ => None,
        }
    }
}

/// Identifier of a time-related claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Claim {
    /// `exp` claim (expiration time).
    Expiration,
    /// `nbf` claim (valid not before).
    NotBefore,
    /// `iat` claim (issued at).
    IssuedAt,
}

impl Claim {
    /// Returns the claim name as it appears in the token.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Expiration => "exp",
            Self::NotBefore => "nbf",
            Self::IssuedAt => "iat",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Reason why a verifying key could not be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyResolutionError {
    /// A key set was supplied, but the token header has no `kid`.
    MissingKeyId,
    /// The `kid` in the token header is not a string.
    InvalidKeyId,
    /// No key in the key set has the `kid` from the token header.
    UnknownKeyId(String),
}

impl fmt::Display for KeyResolutionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKeyId => formatter.write_str("`kid` empty, unable to lookup correct key"),
            Self::InvalidKeyId => formatter.write_str("`kid` is not a string"),
            Self::UnknownKeyId(kid) => {
                write!(formatter, "`kid` `{kid}` invalid, unable to lookup correct key")
            }
        }
    }
}

impl std::error::Error for KeyResolutionError {}

/// Errors that can occur during token decoding and validation.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// Verifying key is empty.
    EmptyKey,
    /// Token string cannot be parsed.
    Malformed(ParseError),
    /// Time-related claim is present, but is not a number.
    MalformedClaim(Claim),
    /// Token header has no `alg` field, or the field is empty.
    MissingAlgorithm,
    /// Algorithm in the token header is not supported by the codec.
    UnsupportedAlgorithm(String),
    /// Algorithm in the token header is supported, but not allowed by the caller.
    AlgorithmNotAllowed(AlgorithmId),
    /// Verifying key cannot be selected from a key set.
    KeyResolution(KeyResolutionError),
    /// Token signature has failed verification.
    InvalidSignature,
    /// Token is not yet valid as per `nbf` or `iat` claim.
    NotYetValid(Claim),
    /// Token has expired.
    Expired,
}

impl ValidationError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyKey | Self::Malformed(_) | Self::MalformedClaim(_) => {
                ErrorKind::MalformedToken
            }
            Self::MissingAlgorithm => ErrorKind::MissingAlgorithm,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::AlgorithmNotAllowed(_) => ErrorKind::AlgorithmNotAllowed,
            Self::KeyResolution(_) => ErrorKind::KeyResolutionFailure,
            Self::InvalidSignature => ErrorKind::SignatureVerificationFailed,
            Self::NotYetValid(_) => ErrorKind::TokenNotYetValid,
            Self::Expired => ErrorKind::TokenExpired,
        }
    }
}

impl From<ParseError> for ValidationError {
    fn from(error: ParseError) -> Self {
        Self::Malformed(error)
    }
}

impl From<KeyResolutionError> for ValidationError {
    fn from(error: KeyResolutionError) -> Self {
        Self::KeyResolution(error)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => formatter.write_str("Key may not be empty"),
            Self::Malformed(e) => write!(formatter, "Malformed token: {e}"),
            Self::MalformedClaim(claim) => {
                write!(formatter, "Claim `{claim}` is not a numeric timestamp")
            }
            Self::MissingAlgorithm => formatter.write_str("Empty algorithm"),
            Self::UnsupportedAlgorithm(alg) => write!(formatter, "Algorithm `{alg}` not supported"),
            Self::AlgorithmNotAllowed(alg) => write!(formatter, "Algorithm `{alg}` not allowed"),
            Self::KeyResolution(e) => fmt::Display::fmt(e, formatter),
            Self::InvalidSignature => formatter.write_str("Signature verification failed"),
            Self::NotYetValid(claim) => {
                write!(formatter, "Cannot handle token prior to its `{claim}` claim")
            }
            Self::Expired => formatter.write_str("Expired token"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            Self::KeyResolution(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that can occur during token creation.
#[derive(Debug)]
#[non_exhaustive]
pub enum CreationError {
    /// Algorithm name is not supported by the codec.
    UnsupportedAlgorithm(String),
    /// Token header cannot be serialized.
    Header(serde_json::Error),
    /// Token claims cannot be serialized into JSON.
    Claims(serde_json::Error),
    /// Cryptographic signer has failed (e.g., the private key is malformed).
    Signing(anyhow::Error),
}

impl CreationError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::Header(_) | Self::Claims(_) | Self::Signing(_) => ErrorKind::SigningFailure,
        }
    }
}

impl fmt::Display for CreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(alg) => write!(formatter, "Algorithm `{alg}` not supported"),
            Self::Header(e) => write!(formatter, "Cannot serialize header: {e}"),
            Self::Claims(e) => write!(formatter, "Cannot serialize claims: {e}"),
            Self::Signing(e) => write!(formatter, "Unable to sign data: {e}"),
        }
    }
}

impl std::error::Error for CreationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(e) | Self::Claims(e) => Some(e),
            Self::Signing(e) => Some(e.as_ref()),
            Self::UnsupportedAlgorithm(_) => None,
        }
    }
}
