//! Provider descriptors and the ordered registry the orchestrator walks.
//!
//! Registry order is the preference ranking: the richest, most trusted
//! provider first, cheaper and less complete fallbacks after it. The order is
//! fixed once the registry is built.

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

use crate::domain::{AssetRecord, MarketsRequest};
use crate::normalize::{self, NormalizeFn};
use crate::{ProviderId, ValidationError};

type RequestBuilder = Arc<dyn Fn(&MarketsRequest) -> String + Send + Sync>;

/// One upstream market data source.
#[derive(Clone)]
pub struct ProviderDescriptor {
    id: ProviderId,
    name: String,
    request: RequestBuilder,
    normalizer: Option<NormalizeFn>,
}

impl ProviderDescriptor {
    /// Descriptor whose responses are already in the canonical shape.
    pub fn new<F>(id: ProviderId, name: impl Into<String>, request: F) -> Self
    where
        F: Fn(&MarketsRequest) -> String + Send + Sync + 'static,
    {
        Self {
            id,
            name: name.into(),
            request: Arc::new(request),
            normalizer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: NormalizeFn) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub const fn id(&self) -> ProviderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_url(&self, request: &MarketsRequest) -> String {
        (self.request)(request)
    }

    pub fn normalize(&self, raw: &Value) -> Vec<AssetRecord> {
        self.normalizer.unwrap_or(normalize::canonical)(raw)
    }
}

impl Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("custom_normalizer", &self.normalizer.is_some())
            .finish()
    }
}

/// Base URLs of the built-in providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub coingecko: String,
    pub binance: String,
    pub coincap: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            coingecko: String::from("https://api.coingecko.com/api/v3"),
            binance: String::from("https://api.binance.com"),
            coincap: String::from("https://api.coincap.io"),
        }
    }
}

/// Ordered, duplicate-free list of providers.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self, ValidationError> {
        if providers.is_empty() {
            return Err(ValidationError::EmptyRegistry);
        }

        let mut seen = HashSet::with_capacity(providers.len());
        for provider in &providers {
            if !seen.insert(provider.id()) {
                return Err(ValidationError::DuplicateProvider {
                    id: provider.id().to_string(),
                });
            }
        }

        Ok(Self { providers })
    }

    /// CoinGecko (full page with sparklines), CoinGecko reduced page,
    /// Binance 24h ticker, CoinCap.
    pub fn builtin(endpoints: &ProviderEndpoints) -> Self {
        let coingecko = trim_base(&endpoints.coingecko);
        let coingecko_demo = coingecko.clone();
        let binance = trim_base(&endpoints.binance);
        let coincap = trim_base(&endpoints.coincap);

        Self {
            providers: vec![
                ProviderDescriptor::new(ProviderId::COINGECKO, "CoinGecko", move |req| {
                    format!(
                        "{coingecko}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=true&price_change_percentage=24h",
                        urlencoding::encode(&req.currency),
                        req.page_size
                    )
                }),
                ProviderDescriptor::new(ProviderId::COINGECKO_DEMO, "CoinGecko Demo", move |req| {
                    format!(
                        "{coingecko_demo}/coins/markets?vs_currency={}&order=market_cap_desc&per_page=10&page=1&sparkline=false",
                        urlencoding::encode(&req.currency)
                    )
                }),
                ProviderDescriptor::new(ProviderId::BINANCE, "Binance", move |_| {
                    format!("{binance}/api/v3/ticker/24hr")
                })
                .with_normalizer(normalize::binance_ticker),
                ProviderDescriptor::new(ProviderId::COINCAP, "CoinCap", move |_| {
                    format!("{coincap}/v2/assets?limit=50")
                })
                .with_normalizer(normalize::coincap_assets),
            ],
        }
    }

    /// Appends a provider after the existing ones.
    pub fn with_provider(mut self, provider: ProviderDescriptor) -> Result<Self, ValidationError> {
        if self.providers.iter().any(|existing| existing.id() == provider.id()) {
            return Err(ValidationError::DuplicateProvider {
                id: provider.id().to_string(),
            });
        }

        self.providers.push(provider);
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(ProviderDescriptor::id).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin(&ProviderEndpoints::default())
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}
