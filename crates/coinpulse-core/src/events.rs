//! Observation hooks for the fetch orchestrator.

use std::time::Duration;

use crate::{ProviderError, ProviderId};

/// Receives one callback per orchestrator transition.
///
/// Every method has an empty default so observers only implement what they
/// care about. Callbacks run inline on the fetching task and must not block.
pub trait FetchObserver: Send + Sync {
    fn on_provider_attempt(&self, provider: ProviderId, url: &str) {
        let _ = (provider, url);
    }

    fn on_provider_failure(&self, error: &ProviderError) {
        let _ = error;
    }

    fn on_provider_success(&self, provider: ProviderId, asset_count: usize) {
        let _ = (provider, asset_count);
    }

    fn on_cache_served(&self, age: Duration, asset_count: usize) {
        let _ = (age, asset_count);
    }

    fn on_stale_served(&self, age: Duration, asset_count: usize) {
        let _ = (age, asset_count);
    }

    fn on_exhausted(&self, failed_attempts: usize) {
        let _ = failed_attempts;
    }

    fn on_detail_fallback(&self, asset_id: &str) {
        let _ = asset_id;
    }
}

/// Default observer: structured `tracing` events under the `coinpulse::fetch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_provider_attempt(&self, provider: ProviderId, url: &str) {
        tracing::debug!(target: "coinpulse::fetch", %provider, url, "trying provider");
    }

    fn on_provider_failure(&self, error: &ProviderError) {
        tracing::warn!(
            target: "coinpulse::fetch",
            provider = %error.provider(),
            code = error.code(),
            status = error.http_status(),
            "provider failed: {}",
            error.message()
        );
    }

    fn on_provider_success(&self, provider: ProviderId, asset_count: usize) {
        tracing::info!(target: "coinpulse::fetch", %provider, asset_count, "provider succeeded");
    }

    fn on_cache_served(&self, age: Duration, asset_count: usize) {
        tracing::debug!(
            target: "coinpulse::fetch",
            age_ms = age.as_millis() as u64,
            asset_count,
            "returning cached market list"
        );
    }

    fn on_stale_served(&self, age: Duration, asset_count: usize) {
        tracing::warn!(
            target: "coinpulse::fetch",
            age_ms = age.as_millis() as u64,
            asset_count,
            "all providers failed, returning stale market list"
        );
    }

    fn on_exhausted(&self, failed_attempts: usize) {
        tracing::error!(
            target: "coinpulse::fetch",
            failed_attempts,
            "all providers failed and no cached market list is available"
        );
    }

    fn on_detail_fallback(&self, asset_id: &str) {
        tracing::warn!(
            target: "coinpulse::fetch",
            asset_id,
            "detail fetch failed, serving cached summary"
        );
    }
}
