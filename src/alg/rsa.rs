//! RSA-based JWT schemes: `RS256`, `RS384` and `RS512`.

use anyhow::Context as _;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::alg::{Algorithm, AlgorithmId, HashAlg};

impl HashAlg {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn pkcs1v15_padding(self) -> Pkcs1v15Sign {
        match self {
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            Self::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            Self::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }
}

/// Integrity algorithm using [RSA] digital signatures with PKCS#1 v1.5 padding.
///
/// Depending on the variation, the algorithm employs one of the hash functions
/// from the SHA-2 family: SHA-256, SHA-384, or SHA-512. See [RFC 7518] for more details.
///
/// Keys are accepted in PEM or DER encoding. Signing keys may be PKCS#8 (`PRIVATE KEY`)
/// or PKCS#1 (`RSA PRIVATE KEY`); verifying keys may be SPKI (`PUBLIC KEY`),
/// PKCS#1 (`RSA PUBLIC KEY`), or a private key, in which case its public half is used.
///
/// [RSA]: https://en.wikipedia.org/wiki/RSA_(cryptosystem)
/// [RFC 7518]: https://www.rfc-editor.org/rfc/rfc7518.html#section-3.3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsa {
    hash_alg: HashAlg,
}

impl Rsa {
    const fn new(hash_alg: HashAlg) -> Self {
        Rsa { hash_alg }
    }

    /// RSA with SHA-256 and PKCS#1 v1.5 padding.
    pub const fn rs256() -> Rsa {
        Rsa::new(HashAlg::Sha256)
    }

    /// RSA with SHA-384 and PKCS#1 v1.5 padding.
    pub const fn rs384() -> Rsa {
        Rsa::new(HashAlg::Sha384)
    }

    /// RSA with SHA-512 and PKCS#1 v1.5 padding.
    pub const fn rs512() -> Rsa {
        Rsa::new(HashAlg::Sha512)
    }

    /// Parses a private key from PEM or DER.
    pub fn parse_private_key(raw: &[u8]) -> anyhow::Result<RsaPrivateKey> {
        if let Ok(pem) = core::str::from_utf8(raw) {
            let pem = pem.trim();
            if pem.starts_with("-----BEGIN") {
                return RsaPrivateKey::from_pkcs8_pem(pem)
                    .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
                    .context("cannot parse PEM-encoded RSA private key");
            }
        }
        RsaPrivateKey::from_pkcs8_der(raw)
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(raw))
            .context("cannot parse DER-encoded RSA private key")
    }

    /// Parses a public key from PEM or DER. Private keys are accepted as well.
    pub fn parse_public_key(raw: &[u8]) -> anyhow::Result<RsaPublicKey> {
        if let Ok(pem) = core::str::from_utf8(raw) {
            let pem = pem.trim();
            if pem.starts_with("-----BEGIN") {
                return RsaPublicKey::from_public_key_pem(pem)
                    .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
                    .or_else(|_| Self::parse_private_key(raw).map(|key| key.to_public_key()))
                    .context("cannot parse PEM-encoded RSA public key");
            }
        }
        RsaPublicKey::from_public_key_der(raw)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(raw))
            .or_else(|_| Self::parse_private_key(raw).map(|key| key.to_public_key()))
            .context("cannot parse DER-encoded RSA public key")
    }
}

impl Algorithm for Rsa {
    fn id(&self) -> AlgorithmId {
        match self.hash_alg {
            HashAlg::Sha256 => AlgorithmId::Rs256,
            HashAlg::Sha384 => AlgorithmId::Rs384,
            HashAlg::Sha512 => AlgorithmId::Rs512,
        }
    }

    fn sign(&self, signing_key: &[u8], message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let signing_key = Self::parse_private_key(signing_key)?;
        let digest = self.hash_alg.digest(message);
        signing_key
            .sign_with_rng(
                &mut rand_core::OsRng,
                self.hash_alg.pkcs1v15_padding(),
                &digest,
            )
            .context("RSA signing failed")
    }

    fn verify_signature(&self, signature: &[u8], verifying_key: &[u8], message: &[u8]) -> bool {
        let Ok(verifying_key) = Self::parse_public_key(verifying_key) else {
            return false;
        };
        let digest = self.hash_alg.digest(message);
        verifying_key
            .verify(self.hash_alg.pkcs1v15_padding(), &digest, signature)
            .is_ok()
    }
}
