use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Identifier of a market data provider, used in diagnostics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProviderId(&'static str);

impl ProviderId {
    pub const COINGECKO: Self = Self("coingecko");
    pub const COINGECKO_DEMO: Self = Self("coingecko_demo");
    pub const BINANCE: Self = Self("binance");
    pub const COINCAP: Self = Self("coincap");

    pub const BUILTIN: [Self; 4] = [
        Self::COINGECKO,
        Self::COINGECKO_DEMO,
        Self::BINANCE,
        Self::COINCAP,
    ];

    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}
