use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

use crate::ProviderId;

/// Validation errors for requests, identifiers, and registry construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency must be a 3-10 character ASCII alphanumeric code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("page size must be between 1 and {max}, got {value}")]
    InvalidPageSize { value: usize, max: usize },
    #[error("asset id cannot be empty")]
    EmptyAssetId,
    #[error("provider registry must contain at least one provider")]
    EmptyRegistry,
    #[error("provider '{id}' is registered more than once")]
    DuplicateProvider { id: String },
}

/// Classification of a single failed provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Transport,
    Timeout,
    Status,
    InvalidPayload,
    Empty,
}

/// Failure of one provider attempt.
///
/// Recovered inside the orchestrator by moving on to the next provider; it is
/// only visible to callers through the fetch observer and [`FetchError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    provider: ProviderId,
    kind: ProviderErrorKind,
    status: Option<u16>,
    message: String,
}

impl ProviderError {
    pub fn transport(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Transport, message)
    }

    pub fn timeout(provider: ProviderId, after: Duration) -> Self {
        Self::new(
            provider,
            ProviderErrorKind::Timeout,
            format!("no response within {} ms", after.as_millis()),
        )
    }

    pub fn status(provider: ProviderId, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(
                provider,
                ProviderErrorKind::Status,
                format!("upstream returned status {status}"),
            )
        }
    }

    pub fn invalid_payload(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::InvalidPayload, message)
    }

    pub fn empty(provider: ProviderId) -> Self {
        Self::new(
            provider,
            ProviderErrorKind::Empty,
            "response normalized to an empty asset list",
        )
    }

    fn new(provider: ProviderId, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub const fn http_status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::Timeout => "provider.timeout",
            ProviderErrorKind::Status => "provider.status",
            ProviderErrorKind::InvalidPayload => "provider.invalid_payload",
            ProviderErrorKind::Empty => "provider.empty",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Errors surfaced by market data fetches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("all market data sources failed and no cached data is available; check connectivity")]
    AllSourcesExhausted { attempts: Vec<ProviderError> },

    #[error("details for asset '{id}' are unavailable and it is not in the cached market list; check connectivity")]
    DetailUnavailable { id: String, cause: ProviderError },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from the remote watchlist store. Never swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("watchlist store is unreachable: {0}")]
    Transport(String),

    #[error("watchlist store rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("watchlist store returned an unreadable payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Malformed configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
