//! Remote watchlist persistence.
//!
//! The store is the source of truth; nothing is cached locally and concurrent
//! calls are not serialized. Every failure is returned to the caller.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::WatchlistStoreConfig;
use crate::domain::WatchlistEntry;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{StoreError, ValidationError};

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Result of [`WatchlistStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistChange {
    Added,
    Removed,
}

/// CRUD contract over the persisted set of watched asset ids.
pub trait WatchlistStore: Send + Sync {
    /// All entries in store order.
    fn list(&self) -> StoreFuture<'_, Vec<WatchlistEntry>>;

    /// Inserts one entry for `asset_id`.
    fn add<'a>(&'a self, asset_id: &'a str) -> StoreFuture<'a, ()>;

    /// Deletes every entry for `asset_id`. Succeeds when nothing matched.
    fn remove<'a>(&'a self, asset_id: &'a str) -> StoreFuture<'a, ()>;

    /// Removes `asset_id` when it is watched, adds it otherwise.
    fn toggle<'a>(&'a self, asset_id: &'a str) -> StoreFuture<'a, WatchlistChange> {
        Box::pin(async move {
            let watched = self
                .list()
                .await?
                .iter()
                .any(|entry| entry.coin_id == asset_id);

            if watched {
                self.remove(asset_id).await?;
                Ok(WatchlistChange::Removed)
            } else {
                self.add(asset_id).await?;
                Ok(WatchlistChange::Added)
            }
        })
    }
}

/// PostgREST-backed store (Supabase `rest/v1`).
pub struct RestWatchlistStore {
    endpoint: String,
    auth: HttpAuth,
    timeout: Duration,
    http_client: Arc<dyn HttpClient>,
}

impl RestWatchlistStore {
    pub fn new(config: &WatchlistStoreConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: &WatchlistStoreConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            endpoint: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
            auth: HttpAuth::AnonKey(config.anon_key.clone()),
            timeout: config.timeout,
            http_client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        request.with_auth(&self.auth).with_timeout(self.timeout)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        let response = self
            .http_client
            .execute(self.authorize(request))
            .await
            .map_err(|error| StoreError::Transport(error.message().to_owned()))?;

        if !response.is_success() {
            return Err(StoreError::Rejected {
                status: response.status,
                message: rejection_message(&response),
            });
        }

        Ok(response)
    }
}

impl WatchlistStore for RestWatchlistStore {
    fn list(&self) -> StoreFuture<'_, Vec<WatchlistEntry>> {
        Box::pin(async move {
            let request = HttpRequest::get(format!("{}?select=*", self.endpoint)).accepting_json();
            let response = self.send(request).await?;

            serde_json::from_str(&response.body)
                .map_err(|error| StoreError::InvalidPayload(error.to_string()))
        })
    }

    fn add<'a>(&'a self, asset_id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let asset_id = checked_id(asset_id)?;
            let body = serde_json::json!([{ "coin_id": asset_id }]).to_string();
            let request = HttpRequest::post(self.endpoint.clone())
                .with_header("prefer", "return=minimal")
                .with_json_body(body);

            self.send(request).await.map(drop)
        })
    }

    fn remove<'a>(&'a self, asset_id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let asset_id = checked_id(asset_id)?;
            let request = HttpRequest::delete(format!(
                "{}?coin_id=eq.{}",
                self.endpoint,
                urlencoding::encode(asset_id)
            ));

            self.send(request).await.map(drop)
        })
    }
}

fn checked_id(asset_id: &str) -> Result<&str, StoreError> {
    let trimmed = asset_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAssetId.into());
    }
    Ok(trimmed)
}

/// PostgREST errors carry `{"message": ...}`; anything else is passed through.
fn rejection_message(response: &HttpResponse) -> String {
    #[derive(Deserialize)]
    struct PostgrestError {
        message: String,
    }

    match serde_json::from_str::<PostgrestError>(&response.body) {
        Ok(error) => error.message,
        Err(_) if response.body.trim().is_empty() => String::from("no response body"),
        Err(_) => response.excerpt(200),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_postgrest_message() {
        let rejected = |body: &str| rejection_message(&HttpResponse::new(403, body));

        assert_eq!(
            rejected(r#"{"code":"42501","message":"permission denied for table watchlist","details":null}"#),
            "permission denied for table watchlist"
        );
        assert_eq!(rejected("Bad Gateway"), "Bad Gateway");
        assert_eq!(rejected("  "), "no response body");
        assert_eq!(rejected("x".repeat(500).as_str()).len(), 200);
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert_eq!(
            checked_id("  "),
            Err(StoreError::Validation(ValidationError::EmptyAssetId))
        );
        assert_eq!(checked_id(" bitcoin "), Ok("bitcoin"));
    }

    #[test]
    fn endpoint_joins_base_url_and_table() {
        let config = WatchlistStoreConfig {
            url: String::from("https://demo.supabase.co/"),
            ..WatchlistStoreConfig::default()
        };

        let store = RestWatchlistStore::new(&config);

        assert_eq!(store.endpoint(), "https://demo.supabase.co/rest/v1/watchlist");
    }
}
