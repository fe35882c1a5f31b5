//! Freshness cache for the last successful market list.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::AssetRecord;
use crate::ProviderId;

/// How long a successful market list is served without touching the network.
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

/// Last successful market list and when it was stored.
#[derive(Debug, Clone)]
pub(crate) struct CachedAssets {
    pub assets: Arc<Vec<AssetRecord>>,
    pub provider: ProviderId,
    pub cached_at: Instant,
}

impl CachedAssets {
    pub fn age(&self) -> Duration {
        self.cached_at.elapsed()
    }

    pub fn is_fresh(&self) -> bool {
        self.age() < CACHE_DURATION
    }
}

/// Single-entry cache. The list and its timestamp are swapped under one lock
/// so readers never see a list paired with another list's timestamp.
#[derive(Debug, Clone, Default)]
pub(crate) struct AssetCache {
    inner: Arc<RwLock<Option<CachedAssets>>>,
}

impl AssetCache {
    /// The entry, only while it is younger than [`CACHE_DURATION`].
    pub async fn fresh(&self) -> Option<CachedAssets> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh())
            .cloned()
    }

    /// The entry regardless of age.
    pub async fn latest(&self) -> Option<CachedAssets> {
        self.inner.read().await.clone()
    }

    /// Replaces any previous entry and restarts its age.
    pub async fn store(&self, provider: ProviderId, assets: Vec<AssetRecord>) -> CachedAssets {
        let entry = CachedAssets {
            assets: Arc::new(assets),
            provider,
            cached_at: Instant::now(),
        };
        *self.inner.write().await = Some(entry.clone());
        entry
    }

    /// Looks up one asset in the entry regardless of age.
    pub async fn find(&self, id: &str) -> Option<AssetRecord> {
        self.inner
            .read()
            .await
            .as_ref()
            .and_then(|entry| entry.assets.iter().find(|asset| asset.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(ids: &[&str]) -> Vec<AssetRecord> {
        ids.iter()
            .map(|id| AssetRecord::new(*id, *id, *id))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_fresh_until_cache_duration_elapses() {
        let cache = AssetCache::default();
        assert!(cache.fresh().await.is_none());

        cache.store(ProviderId::COINGECKO, assets(&["bitcoin"])).await;
        assert!(cache.fresh().await.is_some());

        tokio::time::advance(CACHE_DURATION - Duration::from_secs(1)).await;
        assert!(cache.fresh().await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.fresh().await.is_none());
        assert!(cache.latest().await.is_some(), "expired entry stays available");
    }

    #[tokio::test(start_paused = true)]
    async fn store_overwrites_list_and_timestamp_together() {
        let cache = AssetCache::default();
        cache.store(ProviderId::COINGECKO, assets(&["bitcoin"])).await;

        tokio::time::advance(CACHE_DURATION * 2).await;
        cache.store(ProviderId::COINCAP, assets(&["ethereum", "solana"])).await;

        let entry = cache.fresh().await.expect("new entry is fresh");
        assert_eq!(entry.provider, ProviderId::COINCAP);
        assert_eq!(entry.assets.len(), 2);
        assert_eq!(entry.age(), Duration::ZERO);
    }

    #[tokio::test]
    async fn find_returns_matching_asset() {
        let cache = AssetCache::default();
        assert!(cache.find("bitcoin").await.is_none());

        cache.store(ProviderId::BINANCE, assets(&["bitcoin", "ethereum"])).await;

        assert_eq!(
            cache.find("ethereum").await.map(|asset| asset.id),
            Some(String::from("ethereum"))
        );
        assert!(cache.find("dogecoin").await.is_none());
    }
}
