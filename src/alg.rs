//! Implementations of JWT signing / verification algorithms and the registry
//! mapping `alg` header values to them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use core::{fmt, str::FromStr};
use std::borrow::Cow;

mod generic;
mod hmacs;
mod rsa;

pub use self::generic::{constant_time_eq, SecretBytes};
pub use self::hmacs::{Hs256, Hs384, Hs512};
pub use self::rsa::Rsa;

/// JWT signing algorithm operating on raw key material.
///
/// Unlike typed-key designs, keys are passed as opaque bytes: an HMAC secret for `HS*`
/// algorithms, or a PEM / DER encoded RSA key for `RS*` algorithms. This allows to select
/// an implementation at runtime based on the `alg` field of a token header.
pub trait Algorithm: fmt::Debug + Send + Sync {
    /// Returns the registry identifier of this algorithm.
    fn id(&self) -> AlgorithmId;

    /// Returns the name of this algorithm, as mentioned in the `alg` field of the JWT header.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.id().as_str())
    }

    /// Signs a `message` with the `signing_key`.
    fn sign(&self, signing_key: &[u8], message: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Verifies the `message` against the `signature` and `verifying_key`.
    ///
    /// Any failure (including a malformed key) results in `false`.
    fn verify_signature(&self, signature: &[u8], verifying_key: &[u8], message: &[u8]) -> bool;
}

/// Family of signature schemes an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningFamily {
    /// Symmetric HMAC.
    Hmac,
    /// RSA signatures with PKCS#1 v1.5 padding.
    RsaPkcs1,
}

/// Hash function used by an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlg {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

/// Identifier of a supported JWT signing algorithm.
///
/// (De)serialized as its JOSE name, e.g. `"HS256"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlgorithmId {
    /// HMAC with SHA-256. This is the default algorithm.
    #[default]
    Hs256,
    /// HMAC with SHA-384.
    Hs384,
    /// HMAC with SHA-512.
    Hs512,
    /// RSA PKCS#1 v1.5 with SHA-256.
    Rs256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    Rs384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    Rs512,
}

static HS256: Hs256 = Hs256;
static HS384: Hs384 = Hs384;
static HS512: Hs512 = Hs512;
static RS256: Rsa = Rsa::rs256();
static RS384: Rsa = Rsa::rs384();
static RS512: Rsa = Rsa::rs512();

impl AlgorithmId {
    /// All supported algorithms.
    pub const ALL: [Self; 6] = [
        Self::Hs256,
        Self::Hs384,
        Self::Hs512,
        Self::Rs256,
        Self::Rs384,
        Self::Rs512,
    ];

    /// Returns the JOSE name of the algorithm.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
        }
    }

    /// Looks up an algorithm by its JOSE name. The lookup is case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.as_str() == name)
    }

    /// Returns the signing family of the algorithm.
    pub const fn family(self) -> SigningFamily {
        match self {
            Self::Hs256 | Self::Hs384 | Self::Hs512 => SigningFamily::Hmac,
            Self::Rs256 | Self::Rs384 | Self::Rs512 => SigningFamily::RsaPkcs1,
        }
    }

    /// Returns the hash function used by the algorithm.
    pub const fn hash(self) -> HashAlg {
        match self {
            Self::Hs256 | Self::Rs256 => HashAlg::Sha256,
            Self::Hs384 | Self::Rs384 => HashAlg::Sha384,
            Self::Hs512 | Self::Rs512 => HashAlg::Sha512,
        }
    }

    /// Returns the signing / verification implementation for this algorithm.
    pub fn algorithm(self) -> &'static dyn Algorithm {
        match self {
            Self::Hs256 => &HS256,
            Self::Hs384 => &HS384,
            Self::Hs512 => &HS512,
            Self::Rs256 => &RS256,
            Self::Rs384 => &RS384,
            Self::Rs512 => &RS512,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Algorithm `{}` not supported", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for AlgorithmId {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Cow::<'de, str>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
