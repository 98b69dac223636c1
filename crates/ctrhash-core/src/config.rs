//! Hashing configuration.
//!
//! The core recognizes exactly one parameter, the bucket count, which is also
//! the dimension of every vector produced in a run. A [`HashingConfig`] can only
//! exist in a validated state, so a non-positive bucket count is rejected when
//! the configuration is built, before any record is touched.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::config::HashingConfig;
//!
//! let config = HashingConfig::from_json_str(r#"{"num_buckets": 32768}"#).unwrap();
//! assert_eq!(config.num_buckets(), 32768);
//!
//! assert!(HashingConfig::new(0).is_err());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HashingError, Result};

/// Validated configuration for the hashing transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHashingConfig")]
pub struct HashingConfig {
    /// Number of hash buckets, i.e. the output vector dimension.
    num_buckets: usize,
}

/// Unvalidated wire form of [`HashingConfig`].
///
/// The bucket count is read as a signed integer so that negative values are
/// reported as configuration errors instead of generic parse failures.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHashingConfig {
    num_buckets: i64,
}

impl TryFrom<RawHashingConfig> for HashingConfig {
    type Error = HashingError;

    fn try_from(raw: RawHashingConfig) -> Result<Self> {
        Self::from_signed(raw.num_buckets)
    }
}

impl HashingConfig {
    /// Creates a configuration with the given bucket count.
    ///
    /// # Errors
    ///
    /// Returns `HashingError::InvalidConfiguration` if `num_buckets` is zero.
    pub fn new(num_buckets: usize) -> Result<Self> {
        let config = Self { num_buckets };
        config.validate()?;
        Ok(config)
    }

    /// Creates a configuration from a signed bucket count, as it arrives from
    /// command lines and config files.
    ///
    /// # Errors
    ///
    /// Returns `HashingError::InvalidConfiguration` if `num_buckets <= 0` or it
    /// does not fit the platform's `usize`.
    pub fn from_signed(num_buckets: i64) -> Result<Self> {
        if num_buckets <= 0 {
            return Err(HashingError::config(format!(
                "num_buckets must be positive, got {num_buckets}"
            )));
        }
        let num_buckets = usize::try_from(num_buckets).map_err(|_| {
            HashingError::config(format!("num_buckets {num_buckets} does not fit in usize"))
        })?;
        Self::new(num_buckets)
    }

    /// Parses a JSON document of the form `{"num_buckets": N}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HashingError::config(e.to_string()))
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| HashingError::config(e.to_string()))
    }

    /// Returns the bucket count (the output vector dimension).
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_buckets == 0 {
            return Err(HashingError::config("num_buckets must be positive, got 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_rejects_zero() {
        let result = HashingConfig::new(0);
        assert!(matches!(
            result,
            Err(HashingError::InvalidConfiguration { .. })
        ));
        assert_eq!(HashingConfig::new(4).unwrap().num_buckets(), 4);
    }

    #[test]
    fn test_from_signed() {
        assert!(matches!(
            HashingConfig::from_signed(-3),
            Err(HashingError::InvalidConfiguration { .. })
        ));
        assert!(HashingConfig::from_signed(0).is_err());
        assert_eq!(HashingConfig::from_signed(1).unwrap().num_buckets(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = HashingConfig::new(1000).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, config.to_json_string().unwrap());
        assert_eq!(json, r#"{"num_buckets":1000}"#);
        assert_eq!(HashingConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let err = HashingConfig::from_json_str(r#"{"num_buckets": 0}"#).unwrap_err();
        assert!(matches!(err, HashingError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("must be positive"));

        assert!(HashingConfig::from_json_str(r#"{"num_buckets": -8}"#).is_err());
        assert!(HashingConfig::from_json_str(r#"{}"#).is_err());
        assert!(HashingConfig::from_json_str(r#"{"num_buckets": 8, "seed": 1}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"num_buckets": 32768}}"#).unwrap();

        let config = HashingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.num_buckets(), 32768);

        let missing = HashingConfig::from_file("/nonexistent/ctrhash.json");
        assert!(matches!(missing, Err(HashingError::Io(_))));
    }
}
