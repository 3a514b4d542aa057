//! Verifying key selection.

use std::collections::BTreeMap;

use crate::{alg::SecretBytes, error::KeyResolutionError};

/// Key material used to verify tokens.
///
/// Either a single key used for every token, or a key set indexed by key ID, in which case
/// the key is selected using the `kid` field of the token header. The codec never stores
/// keys; they are borrowed for the duration of a single call.
///
/// # Examples
///
/// ```
/// # use wp_jwt_codec::Key;
/// let single = Key::single("secret");
/// let key_set = Key::from_iter([("k1", "first secret"), ("k2", "second secret")]);
/// assert!(key_set.resolve(Some("k2")).is_ok());
/// assert!(key_set.resolve(Some("k3")).is_err());
/// # assert!(single.resolve(None).is_ok());
/// ```
#[derive(Debug, Clone)]
pub enum Key<'a> {
    /// Single key.
    Single(SecretBytes<'a>),
    /// Keys indexed by key ID.
    ByKid(BTreeMap<String, SecretBytes<'a>>),
}

impl<'a> Key<'a> {
    /// Creates a single key.
    pub fn single(material: impl Into<SecretBytes<'a>>) -> Self {
        Self::Single(material.into())
    }

    /// Checks whether this key is empty, i.e., is an empty byte sequence or an empty key set.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(bytes) => bytes.is_empty(),
            Self::ByKid(keys) => keys.is_empty(),
        }
    }

    /// Selects key material for a token with the specified `kid`.
    ///
    /// A single key is returned regardless of `kid`.
    pub fn resolve(&self, key_id: Option<&str>) -> Result<&[u8], KeyResolutionError> {
        match self {
            Self::Single(bytes) => Ok(&**bytes),
            Self::ByKid(keys) => {
                let key_id = key_id.ok_or(KeyResolutionError::MissingKeyId)?;
                keys.get(key_id)
                    .map(|key| &**key)
                    .ok_or_else(|| KeyResolutionError::UnknownKeyId(key_id.to_owned()))
            }
        }
    }
}

impl<'a, K, V> FromIterator<(K, V)> for Key<'a>
where
    K: Into<String>,
    V: Into<SecretBytes<'a>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::ByKid(
            iter.into_iter()
                .map(|(kid, key)| (kid.into(), key.into()))
                .collect(),
        )
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(material: &'a str) -> Self {
        Self::single(material)
    }
}

impl<'a> From<&'a [u8]> for Key<'a> {
    fn from(material: &'a [u8]) -> Self {
        Self::single(material)
    }
}
