use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Largest page size accepted by the market list providers.
pub const MAX_PAGE_SIZE: usize = 250;

/// Ordered 7-day price samples, serialized in the `{"price": [...]}` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

impl Sparkline {
    pub fn new(price: Vec<f64>) -> Self {
        Self { price }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }
}

/// Canonical, provider-independent asset record.
///
/// Every numeric field is finite. Prices, capitalizations, volumes, and
/// supplies are non-negative; only the 24h change is signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub market_cap: f64,
    #[serde(default)]
    pub market_cap_rank: u32,
    pub total_volume: f64,
    #[serde(default)]
    pub high_24h: f64,
    #[serde(default)]
    pub low_24h: f64,
    pub price_change_percentage_24h: f64,
    #[serde(default)]
    pub circulating_supply: f64,
    #[serde(default)]
    pub total_supply: f64,
    #[serde(default)]
    pub sparkline_in_7d: Sparkline,
}

impl AssetRecord {
    /// Creates a record with every numeric field at zero.
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: String::new(),
            current_price: 0.0,
            market_cap: 0.0,
            market_cap_rank: 0,
            total_volume: 0.0,
            high_24h: 0.0,
            low_24h: 0.0,
            price_change_percentage_24h: 0.0,
            circulating_supply: 0.0,
            total_supply: 0.0,
            sparkline_in_7d: Sparkline::default(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_price(mut self, current_price: f64) -> Self {
        self.current_price = current_price;
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = market_cap;
        self
    }

    pub fn with_volume(mut self, total_volume: f64) -> Self {
        self.total_volume = total_volume;
        self
    }

    pub fn with_change_24h(mut self, percentage: f64) -> Self {
        self.price_change_percentage_24h = percentage;
        self
    }

    pub fn with_sparkline(mut self, prices: Vec<f64>) -> Self {
        self.sparkline_in_7d = Sparkline::new(prices);
        self
    }

    /// Enforces the numeric invariants: non-finite values become zero and
    /// unsigned quantities are clamped at zero.
    pub fn sanitized(mut self) -> Self {
        self.current_price = non_negative(self.current_price);
        self.market_cap = non_negative(self.market_cap);
        self.total_volume = non_negative(self.total_volume);
        self.high_24h = non_negative(self.high_24h);
        self.low_24h = non_negative(self.low_24h);
        self.circulating_supply = non_negative(self.circulating_supply);
        self.total_supply = non_negative(self.total_supply);
        self.price_change_percentage_24h = finite_or_zero(self.price_change_percentage_24h);
        self.sparkline_in_7d.price.retain(|price| price.is_finite());
        self
    }

    /// Case-insensitive match against name or symbol.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.symbol.to_lowercase().contains(&query)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

/// Validates a quote currency code and returns its lowercase form.
///
/// Codes are passed through to providers untouched otherwise; no conversion
/// between currencies happens anywhere in the crate.
pub fn validate_currency_code(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let valid_len = (3..=10).contains(&trimmed.len());
    if !valid_len || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidCurrency {
            value: value.to_owned(),
        });
    }

    Ok(trimmed.to_ascii_lowercase())
}

/// Validated market list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketsRequest {
    pub currency: String,
    pub page_size: usize,
}

impl MarketsRequest {
    pub const DEFAULT_CURRENCY: &'static str = "usd";
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    pub fn new(currency: impl AsRef<str>, page_size: usize) -> Result<Self, ValidationError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidPageSize {
                value: page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        Ok(Self {
            currency: validate_currency_code(currency.as_ref())?,
            page_size,
        })
    }
}

impl Default for MarketsRequest {
    fn default() -> Self {
        Self {
            currency: String::from(Self::DEFAULT_CURRENCY),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Where an asset detail payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailOrigin {
    Live,
    Cached,
}

/// Detail view of a single asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDetails {
    pub asset: AssetRecord,
    pub description: Option<String>,
    pub origin: DetailOrigin,
}

impl AssetDetails {
    pub fn live(asset: AssetRecord, description: Option<String>) -> Self {
        Self {
            asset,
            description,
            origin: DetailOrigin::Live,
        }
    }

    pub fn cached(asset: AssetRecord) -> Self {
        Self {
            asset,
            description: None,
            origin: DetailOrigin::Cached,
        }
    }
}
