//! Fetch-with-fallback over the provider registry, fronted by the freshness cache.
//!
//! ```text
//! fetch_assets ──▶ fresh cache? ──yes──▶ cached list
//!                      │ no
//!                      ▼
//!        provider 1 ─▶ provider 2 ─▶ ... ─▶ provider N      (strict registry order)
//!             │ first non-empty normalized list
//!             ▼
//!        store in cache, return
//!                      │ every provider failed
//!                      ▼
//!        stale cache? ──yes──▶ stale list
//!                      │ no
//!                      ▼
//!        FetchError::AllSourcesExhausted
//! ```
//!
//! Providers are attempted one at a time, never in parallel; the per-request
//! timeout is the only cancellation. Concurrent callers share the cache and
//! the last successful writer wins.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::cache::{AssetCache, CachedAssets};
use crate::config::CoreConfig;
use crate::domain::{AssetDetails, AssetRecord, MarketsRequest};
use crate::events::{FetchObserver, TracingObserver};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize;
use crate::provider::{ProviderDescriptor, ProviderEndpoints, ProviderRegistry};
use crate::{FetchError, ProviderError, ProviderId, ValidationError};

/// Per-provider request budget when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Where the returned market list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOrigin {
    /// Fetched from `provider` during this call.
    Provider { provider: ProviderId },
    /// Served from a cache entry younger than the cache duration.
    Cache { provider: ProviderId, age_ms: u64 },
    /// Every provider failed; served from an expired cache entry.
    Stale { provider: ProviderId, age_ms: u64 },
}

impl FetchOrigin {
    pub const fn provider(self) -> ProviderId {
        match self {
            Self::Provider { provider }
            | Self::Cache { provider, .. }
            | Self::Stale { provider, .. } => provider,
        }
    }

    pub const fn is_network(self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

/// Successful fetch with its provenance.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub assets: Vec<AssetRecord>,
    pub origin: FetchOrigin,
    /// Providers that failed before the result was produced, in attempt order.
    pub failures: Vec<ProviderError>,
    pub latency_ms: u64,
}

/// Owns the provider registry, the transport, and the market list cache.
pub struct FetchOrchestrator {
    registry: ProviderRegistry,
    http_client: Arc<dyn HttpClient>,
    observer: Arc<dyn FetchObserver>,
    request_timeout: Duration,
    details_base_url: String,
    cache: AssetCache,
}

impl FetchOrchestrator {
    pub fn builder() -> FetchOrchestratorBuilder {
        FetchOrchestratorBuilder::new()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the current market list, at most [`CACHE_DURATION`](crate::CACHE_DURATION) old
    /// unless every provider is failing.
    pub async fn fetch_assets(
        &self,
        currency: &str,
        page_size: usize,
    ) -> Result<Vec<AssetRecord>, FetchError> {
        let request = MarketsRequest::new(currency, page_size)?;
        self.fetch_assets_report(&request)
            .await
            .map(|report| report.assets)
    }

    pub async fn fetch_assets_report(
        &self,
        request: &MarketsRequest,
    ) -> Result<FetchReport, FetchError> {
        let started = Instant::now();

        if let Some(entry) = self.cache.fresh().await {
            let age = entry.age();
            self.observer.on_cache_served(age, entry.assets.len());
            return Ok(report(
                &entry,
                FetchOrigin::Cache {
                    provider: entry.provider,
                    age_ms: millis(age),
                },
                Vec::new(),
                started,
            ));
        }

        let mut failures = Vec::new();
        for provider in self.registry.iter() {
            match self.attempt(provider, request).await {
                Ok(assets) => {
                    let entry = self.cache.store(provider.id(), assets).await;
                    self.observer
                        .on_provider_success(provider.id(), entry.assets.len());
                    return Ok(report(
                        &entry,
                        FetchOrigin::Provider {
                            provider: provider.id(),
                        },
                        failures,
                        started,
                    ));
                }
                Err(error) => {
                    self.observer.on_provider_failure(&error);
                    failures.push(error);
                }
            }
        }

        if let Some(entry) = self.cache.latest().await {
            let age = entry.age();
            self.observer.on_stale_served(age, entry.assets.len());
            return Ok(report(
                &entry,
                FetchOrigin::Stale {
                    provider: entry.provider,
                    age_ms: millis(age),
                },
                failures,
                started,
            ));
        }

        self.observer.on_exhausted(failures.len());
        Err(FetchError::AllSourcesExhausted { attempts: failures })
    }

    /// Detail view of one asset from CoinGecko, falling back to the cached
    /// summary record when the detail request fails.
    pub async fn fetch_asset_details(&self, id: &str) -> Result<AssetDetails, FetchError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyAssetId.into());
        }

        let url = format!(
            "{}/coins/{}?sparkline=true",
            self.details_base_url,
            urlencoding::encode(id)
        );
        let live = self
            .get_json(ProviderId::COINGECKO, url)
            .await
            .and_then(|body| {
                normalize::coingecko_coin_detail(&body, MarketsRequest::DEFAULT_CURRENCY)
                    .ok_or_else(|| {
                        ProviderError::invalid_payload(
                            ProviderId::COINGECKO,
                            "detail payload has no asset id",
                        )
                    })
            });

        match live {
            Ok((asset, description)) => Ok(AssetDetails::live(asset, description)),
            Err(error) => {
                self.observer.on_provider_failure(&error);
                match self.cache.find(id).await {
                    Some(asset) => {
                        self.observer.on_detail_fallback(id);
                        Ok(AssetDetails::cached(asset))
                    }
                    None => Err(FetchError::DetailUnavailable {
                        id: id.to_owned(),
                        cause: error,
                    }),
                }
            }
        }
    }

    async fn attempt(
        &self,
        provider: &ProviderDescriptor,
        request: &MarketsRequest,
    ) -> Result<Vec<AssetRecord>, ProviderError> {
        let url = provider.request_url(request);
        self.observer.on_provider_attempt(provider.id(), &url);

        let body = self.get_json(provider.id(), url).await?;
        let assets = provider.normalize(&body);
        if assets.is_empty() {
            return Err(ProviderError::empty(provider.id()));
        }

        Ok(assets)
    }

    async fn get_json(&self, provider: ProviderId, url: String) -> Result<Value, ProviderError> {
        let request = HttpRequest::get(url)
            .accepting_json()
            .with_timeout(self.request_timeout);

        let response =
            match tokio::time::timeout(self.request_timeout, self.http_client.execute(request))
                .await
            {
                Err(_) => return Err(ProviderError::timeout(provider, self.request_timeout)),
                Ok(Err(error)) if error.is_timeout() => {
                    return Err(ProviderError::timeout(provider, self.request_timeout))
                }
                Ok(Err(error)) => return Err(ProviderError::transport(provider, error.message())),
                Ok(Ok(response)) => response,
            };

        if !response.is_success() {
            return Err(ProviderError::status(provider, response.status));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            ProviderError::invalid_payload(provider, format!("response is not JSON: {error}"))
        })
    }
}

fn report(
    entry: &CachedAssets,
    origin: FetchOrigin,
    failures: Vec<ProviderError>,
    started: Instant,
) -> FetchReport {
    FetchReport {
        assets: entry.assets.as_ref().clone(),
        origin,
        failures,
        latency_ms: millis(started.elapsed()),
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

/// Builder for [`FetchOrchestrator`].
///
/// Defaults: built-in provider registry, reqwest transport, tracing observer,
/// 8 second request timeout.
///
/// ```rust,ignore
/// use coinpulse_core::{CoreConfig, FetchOrchestrator};
///
/// let config = CoreConfig::from_env()?;
/// let orchestrator = FetchOrchestrator::builder().with_config(&config).build();
/// let assets = orchestrator.fetch_assets("usd", 50).await?;
/// ```
pub struct FetchOrchestratorBuilder {
    registry: Option<ProviderRegistry>,
    endpoints: ProviderEndpoints,
    http_client: Option<Arc<dyn HttpClient>>,
    observer: Arc<dyn FetchObserver>,
    request_timeout: Duration,
}

impl FetchOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            endpoints: ProviderEndpoints::default(),
            http_client: None,
            observer: Arc::new(TracingObserver),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Applies timeout and provider base URLs from configuration.
    pub fn with_config(mut self, config: &CoreConfig) -> Self {
        self.request_timeout = config.request_timeout;
        self.endpoints = config.endpoints.clone();
        self
    }

    /// Replaces the built-in provider list.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn build(self) -> FetchOrchestrator {
        let registry = self
            .registry
            .unwrap_or_else(|| ProviderRegistry::builtin(&self.endpoints));
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        FetchOrchestrator {
            registry,
            http_client,
            observer: self.observer,
            request_timeout: self.request_timeout,
            details_base_url: self.endpoints.coingecko.trim_end_matches('/').to_owned(),
            cache: AssetCache::default(),
        }
    }
}

impl Default for FetchOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpFuture, HttpResponse};
    use std::sync::Mutex;

    /// Answers every request with the same canned result and records URLs.
    struct FixedHttpClient {
        response: Result<HttpResponse, HttpError>,
        urls: Mutex<Vec<String>>,
    }

    impl FixedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                urls: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().expect("url log is not poisoned").clone()
        }
    }

    impl HttpClient for FixedHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            self.urls
                .lock()
                .expect("url log is not poisoned")
                .push(request.url);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn invalid_currency_fails_before_any_request() {
        let client = FixedHttpClient::new(Ok(HttpResponse::ok_json("[]")));
        let orchestrator = FetchOrchestrator::builder()
            .with_http_client(client.clone())
            .build();

        let error = orchestrator
            .fetch_assets("$$", 50)
            .await
            .expect_err("currency is invalid");

        assert!(matches!(
            error,
            FetchError::Validation(ValidationError::InvalidCurrency { .. })
        ));
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn transport_timeout_is_classified_as_timeout() {
        let client = FixedHttpClient::new(Err(HttpError::timeout("deadline elapsed")));
        let orchestrator = FetchOrchestrator::builder()
            .with_http_client(client.clone())
            .build();

        let error = orchestrator
            .fetch_assets("usd", 50)
            .await
            .expect_err("every provider times out");

        let FetchError::AllSourcesExhausted { attempts } = error else {
            panic!("expected exhaustion, got {error:?}");
        };
        assert_eq!(attempts.len(), 4);
        assert!(attempts
            .iter()
            .all(|attempt| attempt.kind() == crate::ProviderErrorKind::Timeout));
        assert_eq!(client.urls().len(), 4);
    }

    #[tokio::test]
    async fn details_use_configured_base_url() {
        let client = FixedHttpClient::new(Ok(HttpResponse::ok_json(
            r#"{"id":"bitcoin","symbol":"btc","name":"Bitcoin","market_data":{"current_price":{"usd":64000}}}"#,
        )));
        let orchestrator = FetchOrchestrator::builder()
            .with_endpoints(ProviderEndpoints {
                coingecko: String::from("http://gecko.test/api/v3/"),
                ..ProviderEndpoints::default()
            })
            .with_http_client(client.clone())
            .build();

        let details = orchestrator
            .fetch_asset_details("bitcoin")
            .await
            .expect("detail fetch succeeds");

        assert_eq!(details.asset.current_price, 64000.0);
        assert_eq!(
            client.urls(),
            vec![String::from(
                "http://gecko.test/api/v3/coins/bitcoin?sparkline=true"
            )]
        );
    }

    #[test]
    fn origin_reports_its_provider() {
        let origin = FetchOrigin::Stale {
            provider: ProviderId::COINCAP,
            age_ms: 1,
        };

        assert_eq!(origin.provider(), ProviderId::COINCAP);
        assert!(!origin.is_network());
        assert_eq!(
            serde_json::to_value(origin).expect("serializable")["kind"],
            "stale"
        );
    }
}
