//! Cache envelope - the stored form of a cache entry
//!
//! Every value written through the cache engine is wrapped in a
//! [`CacheEnvelope`] carrying the write timestamp and an optional TTL.
//! The freshness rule lives here so that both the read path (evicting
//! `get`) and the pure predicate (`is_expired`) share one definition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stored form of a cache entry: payload plus expiry metadata
///
/// An envelope is *fresh* iff it has no TTL, or the current time is
/// strictly before `written_at + ttl`. Stale envelopes are treated as
/// absent by the cache engine and removed lazily on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// When the entry was written (set on every write)
    pub written_at: DateTime<Utc>,
    /// Time-to-live in milliseconds; `None` means the entry never expires
    pub ttl_ms: Option<u64>,
    /// Byte length of the serialized payload, used for cache size accounting
    pub size: u64,
    /// The caller's value, serialized as JSON
    pub payload: serde_json::Value,
}

impl CacheEnvelope {
    /// Wrap a payload written now with an optional TTL
    #[must_use]
    pub fn new(payload: serde_json::Value, ttl: Option<std::time::Duration>) -> Self {
        let size = payload.to_string().len() as u64;
        Self {
            written_at: Utc::now(),
            ttl_ms: ttl.map(|d| d.as_millis() as u64),
            size,
            payload,
        }
    }

    /// When this envelope expires, or `None` if it never does
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.ttl_ms
            .map(|ms| self.written_at + Duration::milliseconds(ms as i64))
    }

    /// Freshness check against an explicit clock
    ///
    /// Taking `now` as a parameter keeps the rule deterministic and
    /// testable without sleeping.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(deadline) => now < deadline,
            None => true,
        }
    }

    /// Freshness check against the current time
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with_ttl(ttl_ms: u64) -> CacheEnvelope {
        CacheEnvelope::new(
            serde_json::json!({"n": 1}),
            Some(std::time::Duration::from_millis(ttl_ms)),
        )
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let env = CacheEnvelope::new(serde_json::json!("v"), None);
        assert!(env.expires_at().is_none());
        let far_future = Utc::now() + Duration::days(365 * 100);
        assert!(env.is_fresh_at(far_future));
    }

    #[test]
    fn test_fresh_strictly_before_deadline() {
        let env = envelope_with_ttl(1000);
        let deadline = env.expires_at().unwrap();

        assert!(env.is_fresh_at(deadline - Duration::milliseconds(1)));
        // The deadline itself is already stale (now < written_at + ttl).
        assert!(!env.is_fresh_at(deadline));
        assert!(!env.is_fresh_at(deadline + Duration::milliseconds(1)));
    }

    #[test]
    fn test_size_tracks_serialized_payload() {
        let payload = serde_json::json!({"a": [1, 2, 3]});
        let expected = payload.to_string().len() as u64;
        let env = CacheEnvelope::new(payload, None);
        assert_eq!(env.size, expected);
    }

    #[test]
    fn test_serde_roundtrip() {
        let env = envelope_with_ttl(5000);
        let bytes = serde_json::to_vec(&env).unwrap();
        let back: CacheEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.ttl_ms, Some(5000));
        assert_eq!(back.written_at, env.written_at);
        assert_eq!(back.payload, env.payload);
    }
}
