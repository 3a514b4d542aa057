//! Key material container and constant-time comparison shared by all algorithms.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use core::{fmt, ops};
use std::borrow::Cow;

/// Generic container for secret bytes, which can be either owned or borrowed.
/// If owned, bytes are zeroized on drop.
///
/// Comparisons on `SecretBytes` are constant-time, but other operations may be var-time.
/// The `Debug` implementation only reveals the length of the bytes.
#[derive(Clone)]
pub struct SecretBytes<'a>(Cow<'a, [u8]>);

impl<'a> SecretBytes<'a> {
    /// Creates secret bytes from a borrowed slice.
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Self(Cow::Borrowed(bytes))
    }

    /// Creates secret bytes from an owned `Vec`.
    pub fn owned(bytes: Vec<u8>) -> Self {
        Self(Cow::Owned(bytes))
    }

    /// Converts these bytes into an owned form.
    pub fn into_owned(mut self) -> SecretBytes<'static> {
        let bytes = match &mut self.0 {
            Cow::Borrowed(bytes) => bytes.to_vec(),
            Cow::Owned(bytes) => core::mem::take(bytes),
        };
        SecretBytes(Cow::Owned(bytes))
    }
}

impl fmt::Debug for SecretBytes<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SecretBytes")
            .field("len", &self.0.len())
            .finish()
    }
}

impl Drop for SecretBytes<'_> {
    fn drop(&mut self) {
        // if bytes are borrowed, we don't need to perform any special cleaning.
        if let Cow::Owned(bytes) = &mut self.0 {
            Zeroize::zeroize(bytes);
        }
    }
}

impl ops::Deref for SecretBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for SecretBytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl PartialEq for SecretBytes<'_> {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self, other)
    }
}

impl<'a> From<&'a [u8]> for SecretBytes<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::borrowed(bytes)
    }
}

impl<'a> From<&'a str> for SecretBytes<'a> {
    fn from(s: &'a str) -> Self {
        Self::borrowed(s.as_bytes())
    }
}

impl From<Vec<u8>> for SecretBytes<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::owned(bytes)
    }
}

impl From<String> for SecretBytes<'static> {
    fn from(s: String) -> Self {
        Self::owned(s.into_bytes())
    }
}

/// Compares two byte slices in time independent of their contents.
///
/// Slices of different lengths are never equal. In this case, `lhs` is still compared
/// against itself, so the time spent depends only on the length of `lhs`.
pub fn constant_time_eq(lhs: &[u8], rhs: &[u8]) -> bool {
    let same_len = lhs.len() == rhs.len();
    let rhs = if same_len { rhs } else { lhs };
    let bytes_eq = lhs.ct_eq(rhs);
    (bytes_eq & subtle::Choice::from(u8::from(same_len))).into()
}
