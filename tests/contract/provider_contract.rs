#[path = "../support/mod.rs"]
mod support;

use coinpulse_core::normalize::{self, BINANCE_TICKER_LIMIT};
use coinpulse_core::{AssetRecord, MarketsRequest, ProviderId, ProviderRegistry};
use serde_json::{json, Value};

use support::{binance_tickers, coincap_assets, coingecko_detail, coingecko_markets, test_endpoints};

struct ProviderCase {
    id: ProviderId,
    payload: Value,
    expected_records: usize,
    has_sparkline: bool,
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: ProviderId::COINGECKO,
            payload: coingecko_markets(&["bitcoin", "ethereum", "solana"]),
            expected_records: 3,
            has_sparkline: true,
        },
        ProviderCase {
            id: ProviderId::COINGECKO_DEMO,
            payload: coingecko_markets(&["bitcoin"]),
            expected_records: 1,
            has_sparkline: true,
        },
        ProviderCase {
            id: ProviderId::BINANCE,
            payload: binance_tickers(&["BTCUSDT", "ETHUSDT"]),
            expected_records: 2,
            has_sparkline: false,
        },
        ProviderCase {
            id: ProviderId::COINCAP,
            payload: coincap_assets(&["bitcoin", "ethereum"]),
            expected_records: 2,
            has_sparkline: false,
        },
    ]
}

fn assert_canonical(provider: ProviderId, record: &AssetRecord) {
    assert!(!record.id.is_empty(), "provider '{provider}': id present");
    for (field, value) in [
        ("current_price", record.current_price),
        ("market_cap", record.market_cap),
        ("total_volume", record.total_volume),
        ("high_24h", record.high_24h),
        ("low_24h", record.low_24h),
        ("circulating_supply", record.circulating_supply),
        ("total_supply", record.total_supply),
    ] {
        assert!(
            value.is_finite() && value >= 0.0,
            "provider '{provider}': {field} must be finite and non-negative, got {value}"
        );
    }
    assert!(
        record.price_change_percentage_24h.is_finite(),
        "provider '{provider}': change must be finite"
    );
    assert!(
        record.sparkline_in_7d.price.iter().all(|price| price.is_finite()),
        "provider '{provider}': sparkline samples must be finite"
    );
}

#[test]
fn every_builtin_provider_normalizes_its_own_payload() {
    let registry = ProviderRegistry::builtin(&test_endpoints());

    for case in provider_cases() {
        let provider = registry
            .iter()
            .find(|provider| provider.id() == case.id)
            .unwrap_or_else(|| panic!("provider '{}' is registered", case.id));

        let records = provider.normalize(&case.payload);

        assert_eq!(
            records.len(),
            case.expected_records,
            "provider '{}': record count",
            case.id
        );
        for record in &records {
            assert_canonical(case.id, record);
            assert_eq!(
                !record.sparkline_in_7d.is_empty(),
                case.has_sparkline,
                "provider '{}': sparkline presence",
                case.id
            );
        }
    }
}

#[test]
fn every_builtin_provider_survives_malformed_payloads() {
    let registry = ProviderRegistry::default();
    let malformed = [
        Value::Null,
        json!("rate limited"),
        json!(42),
        json!({ "error": "bad request" }),
        json!({ "data": "nope" }),
        json!([null, 1, "x", [1, 2], { "nested": { "id": "bitcoin" } }]),
    ];

    for provider in registry.iter() {
        for payload in &malformed {
            let records = provider.normalize(payload);
            assert!(
                records.is_empty(),
                "provider '{}' produced records from {payload}",
                provider.id()
            );
        }
    }
}

#[test]
fn garbage_numbers_become_zero_instead_of_failing_the_record() {
    let raw = json!([{
        "id": "weird",
        "symbol": "wrd",
        "name": "Weird",
        "current_price": "not a number",
        "market_cap": -12.0,
        "total_volume": null,
        "price_change_percentage_24h": "1e999",
        "sparkline_in_7d": { "price": [1.0, "2.5", null] }
    }]);

    let records = normalize::canonical(&raw);

    assert_eq!(records.len(), 1);
    assert_canonical(ProviderId::COINGECKO, &records[0]);
    assert_eq!(records[0].current_price, 0.0);
    assert_eq!(records[0].market_cap, 0.0);
    assert_eq!(records[0].price_change_percentage_24h, 0.0);
    assert!(records[0].sparkline_in_7d.is_empty(), "mixed samples drop the whole series");
}

#[test]
fn binance_keeps_only_the_first_tickers() {
    let pairs: Vec<String> = (0..BINANCE_TICKER_LIMIT + 10)
        .map(|i| format!("C{i}USDT"))
        .collect();
    let pairs: Vec<&str> = pairs.iter().map(String::as_str).collect();

    let records = normalize::binance_ticker(&binance_tickers(&pairs));

    assert_eq!(records.len(), BINANCE_TICKER_LIMIT);
    assert_eq!(records[0].id, "c0usdt");
    assert_eq!(records[0].name, "C0");
    assert_eq!(records[0].image, "https://cryptologos.cc/logos/c0usdt-logo.png");
    assert_eq!(records[0].total_volume, 2000.0);
    assert_eq!(records[0].market_cap, 2000.0 * 64000.5);
    assert_eq!(records[0].price_change_percentage_24h, -1.25);
}

#[test]
fn coin_detail_is_priced_in_the_requested_currency() {
    let (record, description) =
        normalize::coingecko_coin_detail(&coingecko_detail("bitcoin"), "eur").expect("has id");

    assert_eq!(record.current_price, 59000.0);
    assert_eq!(record.market_cap, 0.0, "no eur market cap in payload");
    assert_eq!(record.market_cap_rank, 1);
    assert!(description.is_some());
    assert!(normalize::coingecko_coin_detail(&json!([coingecko_detail("bitcoin")]), "usd").is_none());
}

#[test]
fn request_urls_follow_provider_conventions() {
    let registry = ProviderRegistry::builtin(&test_endpoints());
    let request = MarketsRequest::new("EUR", 100).expect("valid request");

    let urls: Vec<(ProviderId, String)> = registry
        .iter()
        .map(|provider| (provider.id(), provider.request_url(&request)))
        .collect();

    assert_eq!(
        urls,
        vec![
            (
                ProviderId::COINGECKO,
                String::from("http://gecko.test/coins/markets?vs_currency=eur&order=market_cap_desc&per_page=100&page=1&sparkline=true&price_change_percentage=24h"),
            ),
            (
                ProviderId::COINGECKO_DEMO,
                String::from("http://gecko.test/coins/markets?vs_currency=eur&order=market_cap_desc&per_page=10&page=1&sparkline=false"),
            ),
            (
                ProviderId::BINANCE,
                String::from("http://binance.test/api/v3/ticker/24hr"),
            ),
            (
                ProviderId::COINCAP,
                String::from("http://coincap.test/v2/assets?limit=50"),
            ),
        ]
    );
}
