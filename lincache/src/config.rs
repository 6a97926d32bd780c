//! Declarative cache construction.
//!
//! ```rust
//! use lincache::{
//!     CacheConfig,
//!     Policy,
//! };
//!
//! let mut cache = CacheConfig::new(100)
//!     .with_ratio(0.75)
//!     .with_policy(Policy::Mru)
//!     .build::<u64, String>()
//!     .unwrap();
//! cache.set(1, "hello".to_string()).unwrap();
//! assert_eq!(cache.get(&1).unwrap(), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::{
    Cache,
    Error,
    Policy,
    Result,
};

/// Ratio used when none is given: overflow evicts exactly down to the limit.
pub const DEFAULT_RATIO: f64 = 1.0;

/// Capacity, eviction ratio and policy of a [`Cache`].
///
/// With the `serde` feature a config deserializes from e.g.
/// `{"limit": 128, "policy": "mru"}`; `ratio` and `policy` fall back to
/// [`DEFAULT_RATIO`] and [`Policy::Lru`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Maximum number of entries kept after any write.
    pub limit: usize,
    /// Fraction of `limit` kept when an overflow triggers eviction.
    #[cfg_attr(feature = "serde", serde(default = "default_ratio"))]
    pub ratio: f64,
    /// Which end of the order is evicted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy: Policy,
}

#[cfg(feature = "serde")]
fn default_ratio() -> f64 {
    DEFAULT_RATIO
}

impl CacheConfig {
    /// An LRU config with the default ratio.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ratio: DEFAULT_RATIO,
            policy: Policy::default(),
        }
    }

    /// Sets the eviction ratio.
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Sets the eviction policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks the limit and ratio without building anything.
    pub fn validate(&self) -> Result<()> {
        check_limit(self.limit)?;
        clamp_ratio(self.ratio)?;
        Ok(())
    }

    /// Creates an empty cache from this config.
    pub fn build<K: Hash + Eq, V>(&self) -> Result<Cache<K, V>> {
        Cache::with_ratio(self.limit, self.ratio, self.policy)
    }
}

pub(crate) fn check_limit(limit: usize) -> Result<usize> {
    if limit >= usize::MAX - 1 {
        return Err(Error::invalid_argument(
            "limit",
            format!("capacity too large: {limit}"),
        ));
    }
    Ok(limit)
}

/// NaN is rejected, everything else is clamped into `[0, 1]`.
pub(crate) fn clamp_ratio(ratio: f64) -> Result<f64> {
    if ratio.is_nan() {
        return Err(Error::invalid_argument("ratio", "must not be NaN"));
    }
    Ok(ratio.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CacheConfig::new(8);
        assert_eq!(config.limit, 8);
        assert_eq!(config.ratio, DEFAULT_RATIO);
        assert_eq!(config.policy, Policy::Lru);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        assert!(CacheConfig::new(usize::MAX).validate().is_err());
        assert!(CacheConfig::new(4).with_ratio(f64::NAN).validate().is_err());
        assert_eq!(CacheConfig::new(4).with_ratio(7.0).validate(), Ok(()));
        assert_eq!(CacheConfig::new(0).validate(), Ok(()));
    }

    #[test]
    fn test_clamp_ratio() {
        assert_eq!(clamp_ratio(-1.0), Ok(0.0));
        assert_eq!(clamp_ratio(0.25), Ok(0.25));
        assert_eq!(clamp_ratio(2.0), Ok(1.0));
        assert_eq!(clamp_ratio(f64::INFINITY), Ok(1.0));
        assert_eq!(
            clamp_ratio(f64::NAN),
            Err(Error::invalid_argument("ratio", "must not be NaN"))
        );
    }

    #[test]
    fn test_build() {
        let cache = CacheConfig::new(5)
            .with_ratio(0.5)
            .with_policy(Policy::Mru)
            .build::<u8, u8>()
            .unwrap();
        assert_eq!(cache.limit(), Ok(5));
        assert_eq!(cache.ratio(), Ok(0.5));
        assert_eq!(cache.policy(), Ok(Policy::Mru));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_with_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"limit": 16}"#).unwrap();
        assert_eq!(config, CacheConfig::new(16));

        let config: CacheConfig =
            serde_json::from_str(r#"{"limit": 16, "ratio": 0.5, "policy": "mru"}"#).unwrap();
        assert_eq!(
            config,
            CacheConfig::new(16).with_ratio(0.5).with_policy(Policy::Mru)
        );

        assert!(serde_json::from_str::<CacheConfig>(r#"{"ratio": 0.5}"#).is_err());
        assert!(serde_json::from_str::<CacheConfig>(r#"{"limit": 1, "policy": "lfu"}"#).is_err());
    }
}
