//! In-memory lookup cache with per-entry expiry.
//!
//! Holds verified records and explicit not-found markers keyed by AKI. Expired
//! entries read as a miss and are overwritten by the next store; nothing is
//! evicted eagerly. The lock is only held for map access, never across a fetch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::IssuerRecord;

/// Cached outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedLookup {
    /// Verified record.
    Found(IssuerRecord),
    /// The registry had nothing (or was unreachable) for this AKI.
    NotFound,
}

impl CachedLookup {
    pub fn into_record(self) -> Option<IssuerRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Cache entry with absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CachedLookup,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Lookup cache owned by one registry instance.
#[derive(Debug, Clone)]
pub struct IssuerCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: chrono::Duration,
}

impl IssuerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Clone of the live entry for `aki`, if any.
    pub async fn get(&self, aki: &str) -> Option<CachedLookup> {
        let now = Utc::now();
        let entries = self.entries.read().await;
        entries
            .get(aki)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub async fn put_found(&self, aki: &str, record: IssuerRecord) {
        self.put(aki, CachedLookup::Found(record)).await;
    }

    pub async fn put_not_found(&self, aki: &str) {
        self.put(aki, CachedLookup::NotFound).await;
    }

    async fn put(&self, aki: &str, value: CachedLookup) {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.write().await;
        entries.insert(aki.to_string(), CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisplayInfo, EntityMetadata};

    fn record(id: &str) -> IssuerRecord {
        IssuerRecord {
            issuer_id: format!("x509_aki:{id}"),
            entity_type: "government".into(),
            entity_metadata: EntityMetadata {
                country: "US".into(),
                region: None,
                government_level: "national".into(),
                official_name: "Test".into(),
            },
            display: DisplayInfo {
                name: "Test".into(),
            },
            certificates: vec![],
            signature: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = IssuerCache::new(Duration::from_secs(60));
        assert!(cache.get("a").await.is_none());

        cache.put_found("a", record("a")).await;
        cache.put_not_found("b").await;

        assert_eq!(cache.get("a").await, Some(CachedLookup::Found(record("a"))));
        assert_eq!(cache.get("b").await, Some(CachedLookup::NotFound));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_but_kept() {
        let cache = IssuerCache::new(Duration::from_millis(20));
        cache.put_found("a", record("a")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.len().await, 1);

        cache.put_not_found("a").await;
        assert_eq!(cache.get("a").await, Some(CachedLookup::NotFound));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = IssuerCache::new(Duration::from_secs(60));
        cache.put_not_found("a").await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = IssuerCache::new(Duration::from_secs(u64::MAX));
        assert_eq!(cache.ttl, chrono::Duration::MAX);
    }
}
