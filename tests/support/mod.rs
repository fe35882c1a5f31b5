//! Scripted transport, recording observer, and provider payload fixtures
//! shared by the behavior suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coinpulse_core::{
    FetchObserver, FetchOrchestrator, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse,
    ProviderEndpoints, ProviderError, ProviderId,
};
use serde_json::{json, Value};

/// Substrings identifying each built-in provider's request URL under [`test_endpoints`].
pub const COINGECKO: &str = "gecko.test/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=50";
pub const COINGECKO_DEMO: &str = "gecko.test/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10";
pub const BINANCE: &str = "binance.test/api/v3/ticker/24hr";
pub const COINCAP: &str = "coincap.test/v2/assets";
pub const SUPABASE: &str = "https://project.supabase.test";

pub fn test_endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        coingecko: String::from("http://gecko.test"),
        binance: String::from("http://binance.test"),
        coincap: String::from("http://coincap.test"),
    }
}

/// Canned transport outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Fail(HttpError),
    /// Never completes; only the orchestrator's timeout ends the request.
    Hang,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self::Respond(HttpResponse::ok_json(body.to_string()))
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse::new(status, body))
    }

    pub fn text(body: &str) -> Self {
        Self::Respond(HttpResponse::ok_json(body))
    }

    pub fn unreachable() -> Self {
        Self::Fail(HttpError::new("connection refused"))
    }
}

/// Transport answering by URL substring and recording every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, Reply)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets (or replaces) the reply for URLs containing `pattern`.
    pub fn route(&self, pattern: &str, reply: Reply) {
        let mut routes = self.routes.lock().expect("routes lock");
        routes.retain(|(existing, _)| existing != pattern);
        routes.push((pattern.to_owned(), reply));
    }

    /// Every built-in provider answers with `reply`.
    pub fn route_all_providers(&self, reply: Reply) {
        for pattern in [COINGECKO, COINGECKO_DEMO, BINANCE, COINCAP] {
            self.route(pattern, reply.clone());
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.url).collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let reply = self
            .routes
            .lock()
            .expect("routes lock")
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::Fail(HttpError::new(format!("no route for {}", request.url))));
        self.requests.lock().expect("requests lock").push(request);

        Box::pin(async move {
            match reply {
                Reply::Respond(response) => Ok(response),
                Reply::Fail(error) => Err(error),
                Reply::Hang => std::future::pending().await,
            }
        })
    }
}

/// Observer event, flattened for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Attempt(ProviderId),
    Failure(ProviderId, &'static str),
    Success(ProviderId, usize),
    CacheServed(usize),
    StaleServed(usize),
    Exhausted(usize),
    DetailFallback(String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("events lock").clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl FetchObserver for RecordingObserver {
    fn on_provider_attempt(&self, provider: ProviderId, _url: &str) {
        self.push(Event::Attempt(provider));
    }

    fn on_provider_failure(&self, error: &ProviderError) {
        self.push(Event::Failure(error.provider(), error.code()));
    }

    fn on_provider_success(&self, provider: ProviderId, asset_count: usize) {
        self.push(Event::Success(provider, asset_count));
    }

    fn on_cache_served(&self, _age: Duration, asset_count: usize) {
        self.push(Event::CacheServed(asset_count));
    }

    fn on_stale_served(&self, _age: Duration, asset_count: usize) {
        self.push(Event::StaleServed(asset_count));
    }

    fn on_exhausted(&self, failed_attempts: usize) {
        self.push(Event::Exhausted(failed_attempts));
    }

    fn on_detail_fallback(&self, asset_id: &str) {
        self.push(Event::DetailFallback(asset_id.to_owned()));
    }
}

/// Orchestrator over the scripted transport with an 8 second timeout.
pub fn orchestrator(
    client: &Arc<ScriptedHttpClient>,
    observer: &Arc<RecordingObserver>,
) -> FetchOrchestrator {
    FetchOrchestrator::builder()
        .with_endpoints(test_endpoints())
        .with_http_client(client.clone())
        .with_observer(observer.clone())
        .with_request_timeout(Duration::from_secs(8))
        .build()
}

/// CoinGecko `/coins/markets` rows for `ids`, market cap descending.
pub fn coingecko_markets(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .enumerate()
            .map(|(index, id)| {
                let rank = index as f64 + 1.0;
                json!({
                    "id": id,
                    "symbol": &id[..3.min(id.len())],
                    "name": id.to_uppercase(),
                    "image": format!("https://assets.coingecko.com/{id}.png"),
                    "current_price": 1000.0 / rank,
                    "market_cap": 1_000_000.0 / rank,
                    "market_cap_rank": index + 1,
                    "total_volume": 50_000.0 / rank,
                    "high_24h": 1100.0 / rank,
                    "low_24h": 900.0 / rank,
                    "price_change_percentage_24h": 2.0 - rank,
                    "circulating_supply": 19_000_000.0,
                    "total_supply": 21_000_000.0,
                    "sparkline_in_7d": { "price": [990.0 / rank, 1000.0 / rank] }
                })
            })
            .collect(),
    )
}

/// Binance 24h tickers for `pairs` such as `BTCUSDT`.
pub fn binance_tickers(pairs: &[&str]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|pair| {
                json!({
                    "symbol": pair,
                    "lastPrice": "64000.50",
                    "priceChangePercent": "-1.25",
                    "quoteVolume": "2000.0",
                    "volume": "31.2"
                })
            })
            .collect(),
    )
}

/// CoinCap `/v2/assets` payload for `ids`.
pub fn coincap_assets(ids: &[&str]) -> Value {
    json!({
        "data": ids
            .iter()
            .enumerate()
            .map(|(index, id)| json!({
                "id": id,
                "rank": (index + 1).to_string(),
                "symbol": id[..3.min(id.len())].to_uppercase(),
                "name": id,
                "supply": "19700000.0",
                "maxSupply": null,
                "marketCapUsd": "1260000000000.00",
                "volumeUsd24Hr": "31000000000.00",
                "priceUsd": "64000.12",
                "changePercent24Hr": "0.75"
            }))
            .collect::<Vec<_>>(),
        "timestamp": 1_714_000_000_000_u64
    })
}

/// CoinGecko `/coins/{id}` detail payload.
pub fn coingecko_detail(id: &str) -> Value {
    json!({
        "id": id,
        "symbol": "btc",
        "name": "Bitcoin",
        "market_cap_rank": 1,
        "image": { "large": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png" },
        "description": { "en": "Bitcoin is the first decentralized cryptocurrency." },
        "market_data": {
            "current_price": { "usd": 64000.0, "eur": 59000.0 },
            "market_cap": { "usd": 1_260_000_000_000.0_f64 },
            "total_volume": { "usd": 31_000_000_000.0_f64 },
            "high_24h": { "usd": 65000.0 },
            "low_24h": { "usd": 63000.0 },
            "price_change_percentage_24h": 1.5,
            "circulating_supply": 19_700_000.0,
            "total_supply": 21_000_000.0,
            "sparkline_7d": { "price": [63000.0, 63500.0, 64000.0] }
        }
    })
}
