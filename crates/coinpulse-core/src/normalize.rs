//! Provider response normalizers.
//!
//! Each normalizer maps one provider's raw JSON into canonical
//! [`AssetRecord`]s and is total: malformed numbers become `0`, malformed
//! sequences become empty, and records without an identifier are dropped.
//! Ids are unique per result: the first record carrying an id wins.
//! Records are parsed one by one so a single bad entry never discards the
//! rest of the response.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::AssetRecord;

/// Signature shared by every list normalizer.
pub type NormalizeFn = fn(&Value) -> Vec<AssetRecord>;

/// Number of Binance tickers kept from the (very long) 24h ticker list.
pub const BINANCE_TICKER_LIMIT: usize = 50;

const BINANCE_QUOTE_SUFFIX: &str = "USDT";

/// Canonical market list shape (CoinGecko `/coins/markets`).
pub fn canonical(raw: &Value) -> Vec<AssetRecord> {
    records(raw)
        .filter_map(|item| CanonicalAsset::deserialize(item).ok())
        .filter_map(CanonicalAsset::into_record)
        .fold(Unique::default(), Unique::push)
        .into_records()
}

/// Binance `/api/v3/ticker/24hr`.
pub fn binance_ticker(raw: &Value) -> Vec<AssetRecord> {
    records(raw)
        .take(BINANCE_TICKER_LIMIT)
        .filter_map(|item| BinanceTicker::deserialize(item).ok())
        .filter_map(BinanceTicker::into_record)
        .fold(Unique::default(), Unique::push)
        .into_records()
}

/// CoinCap `/v2/assets`, whose records sit under `data`.
pub fn coincap_assets(raw: &Value) -> Vec<AssetRecord> {
    records(raw.get("data").unwrap_or(&Value::Null))
        .filter_map(|item| CoinCapAsset::deserialize(item).ok())
        .filter_map(CoinCapAsset::into_record)
        .fold(Unique::default(), Unique::push)
        .into_records()
}

/// CoinGecko `/coins/{id}` detail payload, priced in `currency`.
///
/// Returns the record and the English description when present, or `None`
/// when the payload carries no identifier.
pub fn coingecko_coin_detail(raw: &Value, currency: &str) -> Option<(AssetRecord, Option<String>)> {
    if !raw.is_object() {
        return None;
    }

    let detail = CoinDetail::deserialize(raw).ok()?;
    if detail.id.0.is_empty() {
        return None;
    }

    let market = detail.market_data;
    let in_currency = |values: &Value| lenient_number(values.get(currency).unwrap_or(&Value::Null));

    let mut record = AssetRecord::new(detail.id.0, detail.symbol.0, detail.name.0)
        .with_image(detail.image.large.0)
        .with_price(in_currency(&market.current_price))
        .with_market_cap(in_currency(&market.market_cap))
        .with_volume(in_currency(&market.total_volume))
        .with_change_24h(market.price_change_percentage_24h.0)
        .with_sparkline(market.sparkline_7d.price.0);
    record.market_cap_rank = rank(detail.market_cap_rank.0);
    record.high_24h = in_currency(&market.high_24h);
    record.low_24h = in_currency(&market.low_24h);
    record.circulating_supply = market.circulating_supply.0;
    record.total_supply = market.total_supply.0;

    let description = detail
        .description
        .en
        .0
        .trim()
        .to_owned();

    Some((
        record.sanitized(),
        (!description.is_empty()).then_some(description),
    ))
}

fn records(raw: &Value) -> impl Iterator<Item = &Value> {
    raw.as_array()
        .map(|items| items.iter())
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

#[derive(Default)]
struct Unique {
    seen: HashSet<String>,
    records: Vec<AssetRecord>,
}

impl Unique {
    fn push(mut self, record: AssetRecord) -> Self {
        if self.seen.insert(record.id.clone()) {
            self.records.push(record);
        }
        self
    }

    fn into_records(self) -> Vec<AssetRecord> {
        self.records
    }
}

fn lenient_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn rank(value: f64) -> u32 {
    if value >= 1.0 && value <= f64::from(u32::MAX) {
        value as u32
    } else {
        0
    }
}

/// Number that tolerates strings, nulls, and garbage, yielding `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Num(f64);

impl<'de> Deserialize<'de> for Num {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(lenient_number(&Value::deserialize(deserializer)?)))
    }
}

/// Text that tolerates numbers and nulls.
#[derive(Debug, Clone, Default, PartialEq)]
struct Text(String);

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(match Value::deserialize(deserializer)? {
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            _ => String::new(),
        }))
    }
}

/// Price series that collapses to empty unless every sample is numeric.
#[derive(Debug, Clone, Default, PartialEq)]
struct Series(Vec<f64>);

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let samples = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64().filter(|sample| sample.is_finite()))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Ok(Self(samples))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SparklineRaw {
    #[serde(default)]
    price: Series,
}

#[derive(Debug, Deserialize)]
struct CanonicalAsset {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    symbol: Text,
    #[serde(default)]
    name: Text,
    #[serde(default)]
    image: Text,
    #[serde(default)]
    current_price: Num,
    #[serde(default)]
    market_cap: Num,
    #[serde(default)]
    market_cap_rank: Num,
    #[serde(default)]
    total_volume: Num,
    #[serde(default)]
    high_24h: Num,
    #[serde(default)]
    low_24h: Num,
    #[serde(default)]
    price_change_percentage_24h: Num,
    #[serde(default)]
    circulating_supply: Num,
    #[serde(default)]
    total_supply: Num,
    #[serde(default, deserialize_with = "lenient_sparkline")]
    sparkline_in_7d: SparklineRaw,
}

fn lenient_sparkline<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SparklineRaw, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(SparklineRaw::deserialize(&value).unwrap_or_default()),
        _ => Ok(SparklineRaw::default()),
    }
}

impl CanonicalAsset {
    fn into_record(self) -> Option<AssetRecord> {
        if self.id.0.is_empty() {
            return None;
        }

        let mut record = AssetRecord::new(self.id.0, self.symbol.0, self.name.0)
            .with_image(self.image.0)
            .with_price(self.current_price.0)
            .with_market_cap(self.market_cap.0)
            .with_volume(self.total_volume.0)
            .with_change_24h(self.price_change_percentage_24h.0)
            .with_sparkline(self.sparkline_in_7d.price.0);
        record.market_cap_rank = rank(self.market_cap_rank.0);
        record.high_24h = self.high_24h.0;
        record.low_24h = self.low_24h.0;
        record.circulating_supply = self.circulating_supply.0;
        record.total_supply = self.total_supply.0;

        Some(record.sanitized())
    }
}

#[derive(Debug, Deserialize)]
struct BinanceTicker {
    #[serde(default)]
    symbol: Text,
    #[serde(rename = "lastPrice", default)]
    last_price: Num,
    #[serde(rename = "quoteVolume", default)]
    quote_volume: Num,
    #[serde(rename = "priceChangePercent", default)]
    price_change_percent: Num,
}

impl BinanceTicker {
    fn into_record(self) -> Option<AssetRecord> {
        let pair = self.symbol.0;
        if pair.is_empty() {
            return None;
        }

        let id = pair.to_lowercase();
        let base = pair
            .strip_suffix(BINANCE_QUOTE_SUFFIX)
            .filter(|base| !base.is_empty())
            .unwrap_or(&pair)
            .to_owned();

        Some(
            AssetRecord::new(id.clone(), base.to_lowercase(), base)
                .with_image(format!("https://cryptologos.cc/logos/{id}-logo.png"))
                .with_price(self.last_price.0)
                .with_market_cap(self.quote_volume.0 * self.last_price.0)
                .with_volume(self.quote_volume.0)
                .with_change_24h(self.price_change_percent.0)
                .sanitized(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CoinCapAsset {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    symbol: Text,
    #[serde(default)]
    name: Text,
    #[serde(default)]
    rank: Num,
    #[serde(rename = "priceUsd", default)]
    price_usd: Num,
    #[serde(rename = "marketCapUsd", default)]
    market_cap_usd: Num,
    #[serde(rename = "volumeUsd24Hr", default)]
    volume_usd_24h: Num,
    #[serde(rename = "changePercent24Hr", default)]
    change_percent_24h: Num,
    #[serde(default)]
    supply: Num,
    #[serde(rename = "maxSupply", default)]
    max_supply: Num,
}

impl CoinCapAsset {
    fn into_record(self) -> Option<AssetRecord> {
        if self.id.0.is_empty() {
            return None;
        }

        let symbol = self.symbol.0.to_lowercase();
        let mut record = AssetRecord::new(self.id.0, symbol.clone(), self.name.0)
            .with_image(format!(
                "https://assets.coincap.io/assets/icons/{symbol}@2x.png"
            ))
            .with_price(self.price_usd.0)
            .with_market_cap(self.market_cap_usd.0)
            .with_volume(self.volume_usd_24h.0)
            .with_change_24h(self.change_percent_24h.0);
        record.market_cap_rank = rank(self.rank.0);
        record.circulating_supply = self.supply.0;
        record.total_supply = self.max_supply.0;

        Some(record.sanitized())
    }
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    symbol: Text,
    #[serde(default)]
    name: Text,
    #[serde(default)]
    market_cap_rank: Num,
    #[serde(default, deserialize_with = "lenient_object")]
    image: DetailImage,
    #[serde(default, deserialize_with = "lenient_object")]
    description: DetailDescription,
    #[serde(default, deserialize_with = "lenient_object")]
    market_data: DetailMarketData,
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::de::DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).unwrap_or_default()),
        _ => Ok(T::default()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct DetailImage {
    #[serde(default)]
    large: Text,
}

#[derive(Debug, Default, Deserialize)]
struct DetailDescription {
    #[serde(default)]
    en: Text,
}

#[derive(Debug, Default, Deserialize)]
struct DetailMarketData {
    #[serde(default)]
    current_price: Value,
    #[serde(default)]
    market_cap: Value,
    #[serde(default)]
    total_volume: Value,
    #[serde(default)]
    high_24h: Value,
    #[serde(default)]
    low_24h: Value,
    #[serde(default)]
    price_change_percentage_24h: Num,
    #[serde(default)]
    circulating_supply: Num,
    #[serde(default)]
    total_supply: Num,
    #[serde(default, deserialize_with = "lenient_sparkline")]
    sparkline_7d: SparklineRaw,
}
