//! Functionality shared by `algorithms` and `rsa` tests.

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{seq::index::sample as sample_indexes, thread_rng};
use serde::{Deserialize, Serialize};
use wp_jwt_codec::{base64url, prelude::*, ErrorKind, ValidationError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleClaims {
    #[serde(rename = "sub")]
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub admin: bool,
}

/// Creates a codec with the fixed current time.
pub fn fixed_codec(now: i64, leeway: i64) -> TokenCodec<impl Fn() -> DateTime<Utc>> {
    let now = Utc.timestamp_opt(now, 0).single().unwrap();
    TokenCodec::new(TimeOptions::fixed(now, Duration::seconds(leeway)))
}

/// Issuance time of claims produced by [`create_claims()`]; they are valid for 7 days after it.
pub fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 9, 1, 10, 0, 0).single().unwrap()
}

pub fn create_claims() -> Claims {
    let now = issued_at();
    Claims::new()
        .with("sub", "alice")
        .with("name", "Alice")
        .with("admin", true)
        .set_issued_at(now)
        .set_expiration(now + Duration::days(7))
}

/// Checks token creation and validation for `algorithm`, including rejection of tokens
/// with mangled signature, header, and claims.
pub fn test_algorithm(algorithm: AlgorithmId, signing_key: &[u8], verifying_key: &Key<'_>) {
    // Maximum number of signature bits mangled.
    const MAX_MANGLED_BITS: usize = 128;

    let claims = create_claims();
    // Decode within the validity window of `claims`.
    let now = issued_at() + Duration::days(1);
    let codec = fixed_codec(now.timestamp(), 0);
    let allowed = [algorithm];

    // Successful case.
    let token_string = codec.encode(&claims, signing_key, algorithm).unwrap();
    let decoded = codec.decode(&token_string, verifying_key, &allowed).unwrap();
    assert_eq!(decoded, claims);
    let custom: SampleClaims = decoded.deserialize_into().unwrap();
    assert_eq!(custom.subject, "alice");

    // Claims are only accepted within their validity window.
    let expired_at = (issued_at() + Duration::days(7)).timestamp();
    let err = fixed_codec(expired_at, 0)
        .decode(&token_string, verifying_key, &allowed)
        .unwrap_err();
    assert_matches!(err, ValidationError::Expired);
    fixed_codec(expired_at - 1, 0)
        .decode(&token_string, verifying_key, &allowed)
        .unwrap();

    // Mutate signature bits.
    let signature_start = token_string.rfind('.').unwrap() + 1;
    let signature = base64url::decode(&token_string[signature_start..]).unwrap();
    let signature_bits = signature.len() * 8;

    let mangled_bits: Box<dyn Iterator<Item = usize>> = if signature_bits <= MAX_MANGLED_BITS {
        Box::new(0..signature_bits)
    } else {
        let indexes = sample_indexes(&mut thread_rng(), signature_bits, MAX_MANGLED_BITS);
        Box::new(indexes.into_iter())
    };

    for i in mangled_bits {
        let mut mangled_signature = signature.clone();
        mangled_signature[i / 8] ^= 1 << (i % 8) as u8;
        let mangled_signature = base64url::encode(&mangled_signature);

        let mut mangled_str = token_string.clone();
        mangled_str.replace_range(signature_start.., &mangled_signature);
        let err = codec
            .decode(&mangled_str, verifying_key, &allowed)
            .unwrap_err();
        assert_matches!(err, ValidationError::InvalidSignature);
        assert_eq!(err.kind(), ErrorKind::SignatureVerificationFailed);
    }

    // Mutate header.
    let mangled_header = format!(r#"{{"alg":"{algorithm}","typ":"JWT"}}"#);
    let mangled_header = base64url::encode(&mangled_header);
    let header_end = token_string.find('.').unwrap();
    assert_ne!(mangled_header, &token_string[..header_end]);
    let mut mangled_str = token_string.clone();
    mangled_str.replace_range(..header_end, &mangled_header);
    let err = codec
        .decode(&mangled_str, verifying_key, &allowed)
        .unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    // Mutate claims.
    let mut mangled_claims = claims;
    mangled_claims.insert("admin".to_owned(), false.into());
    let claims_string = base64url::encode(serde_json::to_vec(&mangled_claims).unwrap());
    assert_ne!(
        claims_string,
        token_string[(header_end + 1)..(signature_start - 1)]
    );
    let mut mangled_str = token_string.clone();
    mangled_str.replace_range((header_end + 1)..(signature_start - 1), &claims_string);
    let err = codec
        .decode(&mangled_str, verifying_key, &allowed)
        .unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);
}
