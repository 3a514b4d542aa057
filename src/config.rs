//! Serializable codec configuration.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use core::fmt;

use crate::{alg::AlgorithmId, Claims, Key, TimeOptions, TokenCodec, ValidationError};

/// Codec settings that can be loaded from a configuration file.
///
/// All fields are optional; an empty object yields zero leeway, the wall clock,
/// and `HS256` as the only allowed algorithm.
///
/// # Examples
///
/// ```
/// # use wp_jwt_codec::{AlgorithmId, CodecConfig};
/// # fn main() -> anyhow::Result<()> {
/// let config: CodecConfig = serde_json::from_str(
///     r#"{ "leeway": 60, "allowed_algorithms": ["HS256", "RS256"] }"#,
/// )?;
/// assert_eq!(config.allowed_algorithms, [AlgorithmId::Hs256, AlgorithmId::Rs256]);
/// let codec = config.codec()?;
/// assert_eq!(codec.time_options().leeway.num_seconds(), 60);
/// assert_eq!(codec.allowed_algorithms(), [AlgorithmId::Hs256, AlgorithmId::Rs256]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway: u64,
    /// Fixed current time (seconds since the Unix epoch). If not set, the wall clock is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_timestamp: Option<i64>,
    /// Algorithms accepted when decoding tokens.
    #[serde(default = "default_allowed_algorithms")]
    pub allowed_algorithms: Vec<AlgorithmId>,
}

fn default_allowed_algorithms() -> Vec<AlgorithmId> {
    vec![AlgorithmId::Hs256]
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            leeway: 0,
            fixed_timestamp: None,
            allowed_algorithms: default_allowed_algorithms(),
        }
    }
}

/// Errors converting [`CodecConfig`] into time options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Leeway cannot be represented as a duration.
    LeewayOutOfRange(u64),
    /// Fixed timestamp cannot be represented as a date.
    TimestampOutOfRange(i64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeewayOutOfRange(leeway) => write!(formatter, "leeway {leeway}s is too large"),
            Self::TimestampOutOfRange(timestamp) => {
                write!(formatter, "timestamp {timestamp} is out of range")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl CodecConfig {
    /// Converts this configuration into time options.
    pub fn time_options(
        &self,
    ) -> Result<TimeOptions<impl Fn() -> DateTime<Utc> + Copy + Send + Sync>, ConfigError> {
        let leeway = i64::try_from(self.leeway)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(ConfigError::LeewayOutOfRange(self.leeway))?;
        let fixed_now = self
            .fixed_timestamp
            .map(|timestamp| {
                Utc.timestamp_opt(timestamp, 0)
                    .single()
                    .ok_or(ConfigError::TimestampOutOfRange(timestamp))
            })
            .transpose()?;
        Ok(TimeOptions::new(leeway, move || {
            fixed_now.unwrap_or_else(Utc::now)
        }))
    }

    /// Creates a codec based on this configuration. The returned codec decodes tokens
    /// with the configured [allow-list](Self::allowed_algorithms).
    pub fn codec(
        &self,
    ) -> Result<ConfiguredCodec<impl Fn() -> DateTime<Utc> + Copy + Send + Sync>, ConfigError>
    {
        let options = self.time_options()?;
        Ok(ConfiguredCodec {
            inner: TokenCodec::new(options),
            allowed_algorithms: self.allowed_algorithms.iter().copied().collect(),
        })
    }
}

/// [`TokenCodec`] bound to the algorithm allow-list of a [`CodecConfig`].
#[derive(Debug, Clone)]
pub struct ConfiguredCodec<F = fn() -> DateTime<Utc>> {
    inner: TokenCodec<F>,
    allowed_algorithms: SmallVec<[AlgorithmId; 6]>,
}

impl<F: Fn() -> DateTime<Utc>> ConfiguredCodec<F> {
    /// Returns the underlying codec, e.g., to create tokens.
    pub fn codec(&self) -> &TokenCodec<F> {
        &self.inner
    }

    /// Returns time options used by this codec.
    pub fn time_options(&self) -> &TimeOptions<F> {
        self.inner.time_options()
    }

    /// Returns algorithms accepted by [`Self::decode()`].
    pub fn allowed_algorithms(&self) -> &[AlgorithmId] {
        &self.allowed_algorithms
    }

    /// Decodes and validates a token, accepting only the configured algorithms.
    /// See [`TokenCodec::decode()`] for the validation steps.
    pub fn decode(&self, token: &str, key: &Key<'_>) -> Result<Claims, ValidationError> {
        self.inner.decode(token, key, &self.allowed_algorithms)
    }
}
