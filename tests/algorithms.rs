//! General tests for HMAC algorithms and the codec contract.

use assert_matches::assert_matches;
use serde_json::json;

mod shared;

use crate::shared::{fixed_codec, test_algorithm, SampleClaims};
use wp_jwt_codec::{
    base64url, prelude::*, Claim, ErrorKind, Header, KeyResolutionError, ParseError,
    ValidationError,
};

#[test]
fn hs256_reference() {
    //! Example from https://tools.ietf.org/html/rfc7515#appendix-A.1

    const TOKEN: &str =
        "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAs\
         DQogImh0dHA6Ly9leGFtcGxlLmNvbS9pc19yb290Ijp0cnVlfQ.dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1\
         gFWFOEjXk";
    const KEY: &str =
        "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow";

    let token = UntrustedToken::new(TOKEN).unwrap();
    assert_eq!(token.algorithm(), Some("HS256"));

    let key = base64url::decode(KEY).unwrap();
    let key = Key::single(key);
    let claims = fixed_codec(1_300_819_379, 0)
        .decode(TOKEN, &key, &[AlgorithmId::Hs256])
        .unwrap();
    assert_eq!(claims["exp"], json!(1_300_819_380));
    assert_eq!(claims["iss"], json!("joe"));
    assert_eq!(claims["http://example.com/is_root"], json!(true));

    // The token expires exactly at its `exp` timestamp.
    let err = fixed_codec(1_300_819_380, 0)
        .decode(TOKEN, &key, &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_matches!(err, ValidationError::Expired);
}

#[test]
fn hs384_reference() {
    //! Example generated using https://jwt.io/

    const TOKEN: &str =
        "eyJhbGciOiJIUzM4NCIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9l\
         IiwiYWRtaW4iOnRydWUsImlhdCI6MTUxNjIzOTAyMn0.bQTnz6AuMJvmXXQsVPrxeQNvzDkimo7VNXxHeSBfC\
         lLufmCVZRUuyTwJF311JHuh";
    const KEY: &str = "your-384-bit-secret";

    let token = UntrustedToken::new(TOKEN).unwrap();
    assert_eq!(token.algorithm(), Some("HS384"));
    assert_eq!(token.header()["typ"], json!("JWT"));

    let claims = fixed_codec(1_516_239_022, 0)
        .decode(TOKEN, &Key::single(KEY), &[AlgorithmId::Hs384])
        .unwrap();
    assert_eq!(claims["iat"], json!(1_516_239_022));
    assert_eq!(
        claims.deserialize_into::<SampleClaims>().unwrap(),
        SampleClaims {
            subject: "1234567890".to_owned(),
            name: "John Doe".to_owned(),
            admin: true,
        }
    );

    // Issued one second in the future.
    let err = fixed_codec(1_516_239_021, 0)
        .decode(TOKEN, &Key::single(KEY), &[AlgorithmId::Hs384])
        .unwrap_err();
    assert_matches!(err, ValidationError::NotYetValid(Claim::IssuedAt));
    fixed_codec(1_516_239_021, 1)
        .decode(TOKEN, &Key::single(KEY), &[AlgorithmId::Hs384])
        .unwrap();
}

#[test]
fn hs512_reference() {
    //! Example generated using https://jwt.io/

    const TOKEN: &str =
        "eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiI5ODc2NTQzMjEiLCJuYW1lIjoiSmFuZSBEb2Ui\
         LCJhZG1pbiI6ZmFsc2UsImlhdCI6MTUxNjIzOTEyMn0.zGgI9yNlkGofH0aIuYq7v_VPi6THftCS-59DXMQ0X\
         ugapLalKKDo6qAJkBy0i8d9DFcYIySIUgQ69Dprvp4fpA";
    const KEY: &str = "your-512-bit-secret";

    let token = UntrustedToken::new(TOKEN).unwrap();
    assert_eq!(token.algorithm(), Some("HS512"));

    let claims = fixed_codec(1_600_000_000, 0)
        .decode(TOKEN, &Key::single(KEY), &AlgorithmId::ALL)
        .unwrap();
    assert_eq!(
        claims.deserialize_into::<SampleClaims>().unwrap(),
        SampleClaims {
            subject: "987654321".to_owned(),
            name: "Jane Doe".to_owned(),
            admin: false,
        }
    );
}

const HMAC_KEY: &str = "super_secret_key_donut_steel";

#[test]
fn hs256_algorithm() {
    test_algorithm(AlgorithmId::Hs256, HMAC_KEY.as_bytes(), &Key::single(HMAC_KEY));
}

#[test]
fn hs384_algorithm() {
    test_algorithm(AlgorithmId::Hs384, HMAC_KEY.as_bytes(), &Key::single(HMAC_KEY));
}

#[test]
fn hs512_algorithm() {
    test_algorithm(AlgorithmId::Hs512, HMAC_KEY.as_bytes(), &Key::single(HMAC_KEY));
}

#[test]
fn round_trip_preserves_claims() {
    let codec = fixed_codec(1_000_000_000, 0);
    let claims = Claims::new()
        .with("sub", "42")
        .with("nested", json!({ "roles": ["admin", "editor"], "meta": null }))
        .with("exp", 2_000_000_000);
    for algorithm in [AlgorithmId::Hs256, AlgorithmId::Hs384, AlgorithmId::Hs512] {
        let token = codec.encode(&claims, "secret", algorithm).unwrap();
        let decoded = codec
            .decode(&token, &Key::single("secret"), &[algorithm])
            .unwrap();
        assert_eq!(decoded, claims);
    }
}

#[test]
fn scenario_token_is_reproducible() {
    const EXPECTED: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.\
                            eyJzdWIiOiI0MiIsImV4cCI6MjAwMDAwMDAwMH0.\
                            ivR197RBofofP18f4dGBVoMmeu7RlO0mhiiJ0AgE934";

    let codec = fixed_codec(1_000_000_000, 0);
    let claims = json!({ "sub": "42", "exp": 2_000_000_000 });
    let token = codec.encode(&claims, "secret", AlgorithmId::Hs256).unwrap();
    assert_eq!(token, EXPECTED);

    let decoded = codec
        .decode(&token, &Key::single("secret"), &[AlgorithmId::Hs256])
        .unwrap();
    assert_eq!(serde_json::to_value(decoded).unwrap(), claims);
}

#[test]
fn algorithm_allow_list() {
    let codec = fixed_codec(1_000_000_000, 0);
    let token = codec
        .encode(&Claims::new(), "secret", AlgorithmId::Hs256)
        .unwrap();
    let err = codec
        .decode(&token, &Key::single("secret"), &[AlgorithmId::Hs384])
        .unwrap_err();
    assert_matches!(err, ValidationError::AlgorithmNotAllowed(AlgorithmId::Hs256));
    assert_eq!(err.kind(), ErrorKind::AlgorithmNotAllowed);

    // An HMAC token cannot be verified using an RSA public key as a secret
    // unless the caller explicitly allows HMAC algorithms.
    let public_key = include_str!("keys/rsa_public.pem");
    let token = codec
        .encode(&Claims::new(), public_key, AlgorithmId::Hs256)
        .unwrap();
    let err = codec
        .decode(&token, &Key::single(public_key), &[AlgorithmId::Rs256])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlgorithmNotAllowed);
}

#[test]
fn expiration_boundary() {
    const NOW: i64 = 1_000_000_000;

    let claims = Claims::new().with("exp", NOW);
    let token = fixed_codec(NOW, 0)
        .encode(&claims, "secret", AlgorithmId::Hs256)
        .unwrap();
    let key = Key::single("secret");

    let err = fixed_codec(NOW, 0)
        .decode(&token, &key, &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenExpired);
    assert_eq!(err.to_string(), "Expired token");
    fixed_codec(NOW - 1, 0)
        .decode(&token, &key, &[AlgorithmId::Hs256])
        .unwrap();
    fixed_codec(NOW, 1)
        .decode(&token, &key, &[AlgorithmId::Hs256])
        .unwrap();
}

#[test]
fn not_before_with_leeway() {
    const NOW: i64 = 1_000_000_000;

    let claims = Claims::new().with("nbf", NOW + 10);
    let token = fixed_codec(NOW, 0)
        .encode(&claims, "secret", AlgorithmId::Hs256)
        .unwrap();
    let key = Key::single("secret");

    let err = fixed_codec(NOW, 0)
        .decode(&token, &key, &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_matches!(err, ValidationError::NotYetValid(Claim::NotBefore));
    assert_eq!(err.kind(), ErrorKind::TokenNotYetValid);
    fixed_codec(NOW, 10)
        .decode(&token, &key, &[AlgorithmId::Hs256])
        .unwrap();
}

#[test]
fn multiple_keys() {
    let codec = fixed_codec(1_000_000_000, 0);
    let header = Header::default().with_key_id("k2");
    let token = codec
        .encode_with(&Claims::new().with("sub", "42"), "second", AlgorithmId::Hs256, &header)
        .unwrap();
    let allowed = [AlgorithmId::Hs256];

    let keys = Key::from_iter([("k1", "first"), ("k2", "second")]);
    let claims = codec.decode(&token, &keys, &allowed).unwrap();
    assert_eq!(claims["sub"], json!("42"));

    let wrong_keys = Key::from_iter([("k1", "second"), ("k2", "first")]);
    let err = codec.decode(&token, &wrong_keys, &allowed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureVerificationFailed);

    let missing_keys = Key::from_iter([("k1", "second")]);
    let err = codec.decode(&token, &missing_keys, &allowed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyResolutionFailure);
    assert_matches!(
        err,
        ValidationError::KeyResolution(KeyResolutionError::UnknownKeyId(kid)) if kid == "k2"
    );
}

#[test]
fn malformed_tokens() {
    let codec = fixed_codec(1_000_000_000, 0);
    let key = Key::single("secret");
    for token in ["not.a.jwt.extra", "abc.def"] {
        let err = codec
            .decode(token, &key, &[AlgorithmId::Hs256])
            .unwrap_err();
        assert_matches!(
            err,
            ValidationError::Malformed(ParseError::InvalidTokenStructure)
        );
        assert_eq!(err.kind(), ErrorKind::MalformedToken);
    }

    let err = codec
        .decode("e30.e30.!!!", &key, &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedToken);
}

#[test]
fn decode_errors_are_reported_in_order() {
    let codec = fixed_codec(1_000_000_000, 0);

    // Missing `alg` is reported even if the signature is garbage.
    let err = codec
        .decode("e30.e30.AAAA", &Key::single("secret"), &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingAlgorithm);

    // Empty key is reported before malformed tokens.
    let err = codec
        .decode("abc.def", &Key::single(""), &[AlgorithmId::Hs256])
        .unwrap_err();
    assert_matches!(err, ValidationError::EmptyKey);
    assert_eq!(err.kind(), ErrorKind::MalformedToken);
}
