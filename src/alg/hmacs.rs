//! JWT algorithms based on HMACs.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::alg::{constant_time_eq, Algorithm, AlgorithmId};

macro_rules! define_hmac_algorithm {
    (
        $(#[$($attr:meta)+])*
        struct $name:ident<$digest:ident>($id:ident);
    ) => {
        $(#[$($attr)+])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            /// Computes HMAC with the specified `key` and `message`.
            fn hmac(key: &[u8], message: &[u8]) -> anyhow::Result<Vec<u8>> {
                let mut hmac = Hmac::<$digest>::new_from_slice(key)
                    .map_err(|err| anyhow::anyhow!("cannot initialize HMAC: {err}"))?;
                hmac.update(message);
                Ok(hmac.finalize().into_bytes().to_vec())
            }
        }

        impl Algorithm for $name {
            fn id(&self) -> AlgorithmId {
                AlgorithmId::$id
            }

            fn sign(&self, signing_key: &[u8], message: &[u8]) -> anyhow::Result<Vec<u8>> {
                Self::hmac(signing_key, message)
            }

            fn verify_signature(
                &self,
                signature: &[u8],
                verifying_key: &[u8],
                message: &[u8],
            ) -> bool {
                match Self::hmac(verifying_key, message) {
                    Ok(expected) => constant_time_eq(&expected, signature),
                    Err(_) => false,
                }
            }
        }
    };
}

define_hmac_algorithm! {
    /// `HS256` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs256<Sha256>(Hs256);
}

define_hmac_algorithm! {
    /// `HS384` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs384<Sha384>(Hs384);
}

define_hmac_algorithm! {
    /// `HS512` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs512<Sha512>(Hs512);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_signature_lengths() {
        let message = b"header.claims";
        assert_eq!(Hs256.sign(b"key", message).unwrap().len(), 32);
        assert_eq!(Hs384.sign(b"key", message).unwrap().len(), 48);
        assert_eq!(Hs512.sign(b"key", message).unwrap().len(), 64);
    }

    #[test]
    fn hs256_matches_rfc4231_test_case() {
        // Test case 2 from RFC 4231.
        let signature = Hs256
            .sign(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        let expected = [
            0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e, 0x6a, 0x04, 0x24, 0x26, 0x08, 0x95,
            0x75, 0xc7, 0x5a, 0x00, 0x3f, 0x08, 0x9d, 0x27, 0x39, 0x83, 0x9d, 0xec, 0x58, 0xb9,
            0x64, 0xec, 0x38, 0x43,
        ];
        assert_eq!(signature, expected);
    }

    #[test]
    fn hmac_verification() {
        let message = b"header.claims";
        let signature = Hs384.sign(b"key", message).unwrap();
        assert!(Hs384.verify_signature(&signature, b"key", message));
        assert!(!Hs384.verify_signature(&signature, b"other key", message));
        assert!(!Hs384.verify_signature(&signature, b"key", b"header.claimz"));
        assert!(!Hs384.verify_signature(&signature[..47], b"key", message));
        // Signature produced by another hash function is rejected.
        let signature = Hs512.sign(b"key", message).unwrap();
        assert!(!Hs384.verify_signature(&signature, b"key", message));
    }
}
