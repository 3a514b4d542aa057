use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use core::ops;

use crate::{Claim, ValidationError};

/// Time-related validation options.
///
/// Options are fixed when a [`TokenCodec`](crate::TokenCodec) is created and are only read
/// afterwards, so a single instance can be shared by concurrent decoders.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct TimeOptions<F = fn() -> DateTime<Utc>> {
    /// Leeway to use during validation.
    pub leeway: Duration,
    /// Source of the current timestamps.
    pub clock_fn: F,
}

impl<F: Fn() -> DateTime<Utc>> TimeOptions<F> {
    /// Creates options based on the specified time leeway and clock function.
    pub fn new(leeway: Duration, clock_fn: F) -> Self {
        Self { leeway, clock_fn }
    }

    /// Returns the current time as reported by the clock function.
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock_fn)()
    }
}

impl TimeOptions {
    /// Creates options based on the specified time leeway. The clock source is [`Utc::now()`].
    pub fn from_leeway(leeway: Duration) -> Self {
        Self {
            leeway,
            clock_fn: Utc::now,
        }
    }

    /// Creates options with the fixed current time and the specified leeway. Useful for tests
    /// and for replaying token validation.
    pub fn fixed(
        now: DateTime<Utc>,
        leeway: Duration,
    ) -> TimeOptions<impl Fn() -> DateTime<Utc> + Copy + Send + Sync> {
        TimeOptions::new(leeway, move || now)
    }
}

/// Default options use the wall clock and zero leeway.
impl Default for TimeOptions {
    fn default() -> Self {
        Self::from_leeway(Duration::zero())
    }
}

/// Claims encoded in a token.
///
/// Claims are an open JSON object. Of its fields, only `exp`, `nbf` and `iat` have a meaning
/// for the codec; they must be numeric timestamps (seconds since the Unix epoch) if present.
/// A claim with the `null` value is treated as absent. All other claims are passed through
/// as is; the field order is preserved.
///
/// # Examples
///
/// ```
/// # use chrono::{Duration, TimeZone, Utc};
/// # use serde_json::json;
/// # use wp_jwt_codec::{Claims, TimeOptions};
/// let now = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
/// let options = TimeOptions::fixed(now, Duration::zero());
/// let claims = Claims::new()
///     .with("sub", "42")
///     .set_duration_and_issuance(&options, Duration::minutes(5));
/// assert_eq!(claims["exp"], json!(1_600_000_300));
/// assert!(claims.validate_expiration(&options).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Creates an empty claims instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a claim with the specified name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Sets the `exp` claim.
    #[must_use]
    pub fn set_expiration(self, moment: DateTime<Utc>) -> Self {
        self.with(Claim::Expiration.name(), moment.timestamp())
    }

    /// Sets the `nbf` claim.
    #[must_use]
    pub fn set_not_before(self, moment: DateTime<Utc>) -> Self {
        self.with(Claim::NotBefore.name(), moment.timestamp())
    }

    /// Sets the `iat` claim.
    #[must_use]
    pub fn set_issued_at(self, moment: DateTime<Utc>) -> Self {
        self.with(Claim::IssuedAt.name(), moment.timestamp())
    }

    /// Atomically sets `iat` and `exp` claims: first to the current time (as per `options`),
    /// and the second to match the specified `duration` of the token.
    #[must_use]
    pub fn set_duration_and_issuance<F>(self, options: &TimeOptions<F>, duration: Duration) -> Self
    where
        F: Fn() -> DateTime<Utc>,
    {
        let issued_at = options.now();
        self.set_issued_at(issued_at)
            .set_expiration(issued_at + duration)
    }

    /// Returns the value of a time-related claim in seconds, or `None` if the claim
    /// is absent or `null`.
    pub fn timestamp(&self, claim: Claim) -> Result<Option<f64>, ValidationError> {
        match self.0.get(claim.name()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number
                .as_f64()
                .map(Some)
                .ok_or(ValidationError::MalformedClaim(claim)),
            Some(_) => Err(ValidationError::MalformedClaim(claim)),
        }
    }

    /// Validates the maturity date (`nbf` claim).
    ///
    /// This method will return an error if the claim is in the future
    /// (subject to the provided `options`). A missing claim is valid.
    pub fn validate_maturity<F>(&self, options: &TimeOptions<F>) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        self.validate_not_in_future(Claim::NotBefore, options)
    }

    /// Validates the issuance date (`iat` claim).
    ///
    /// A token issued in the future is rejected in the same way as an immature token
    /// (subject to the provided `options`). A missing claim is valid.
    pub fn validate_issuance<F>(&self, options: &TimeOptions<F>) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        self.validate_not_in_future(Claim::IssuedAt, options)
    }

    fn validate_not_in_future<F>(
        &self,
        claim: Claim,
        options: &TimeOptions<F>,
    ) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        if let Some(timestamp) = self.timestamp(claim)? {
            let latest = options.now().timestamp() + options.leeway.num_seconds();
            if timestamp > latest as f64 {
                return Err(ValidationError::NotYetValid(claim));
            }
        }
        Ok(self)
    }

    /// Validates the expiration claim.
    ///
    /// This method will return an error if the claim is not in the future
    /// (subject to the provided `options`); i.e., a token expires at the `exp` second.
    /// A missing claim is valid.
    pub fn validate_expiration<F>(&self, options: &TimeOptions<F>) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        if let Some(expiration) = self.timestamp(Claim::Expiration)? {
            let now = options.now().timestamp() - options.leeway.num_seconds();
            if now as f64 >= expiration {
                return Err(ValidationError::Expired);
            }
        }
        Ok(self)
    }

    /// Deserializes claims into a custom type.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    /// Returns the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl ops::Deref for Claims {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Claims {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
