//! HTTP client for the upstream catalog API.
//!
//! Wraps `reqwest` with a bounded timeout and typed errors. Each call is a
//! single attempt; there is no retry loop.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::UpstreamError;
use crate::types::{LoginRequest, LoginResponse, RawProduct};

/// Client for the upstream login and product-list endpoints.
///
/// Holds no credentials: the bearer token is passed per call so the caller
/// owns the token lifecycle.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    login_url: Url,
    products_url: Url,
}

impl UpstreamClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`UpstreamError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute `http`/`https` URL with a host.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // A single trailing slash makes `join` append to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let invalid = |reason: String| UpstreamError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        if base.cannot_be_a_base() || base.host_str().is_none_or(str::is_empty) {
            return Err(invalid("URL has no host".to_string()));
        }
        let login_url = base.join("login").map_err(|e| invalid(e.to_string()))?;
        let products_url = base.join("products").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            login_url,
            products_url,
        })
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::LoginRejected`] if upstream answers without a token.
    /// - [`UpstreamError::Http`] on network failure or timeout.
    /// - [`UpstreamError::UnexpectedStatus`] on a non-2xx status.
    /// - [`UpstreamError::Deserialize`] if the body is not valid JSON.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, UpstreamError> {
        tracing::debug!(url = %self.login_url, "logging in to upstream");

        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let body: LoginResponse = read_json(response, &self.login_url).await?;
        match body.token {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => {
                tracing::warn!("upstream login answered without a token");
                Err(UpstreamError::LoginRejected)
            }
        }
    }

    /// Fetches the full product list using `token` as bearer credential.
    ///
    /// Array entries that are not product objects are skipped rather than
    /// failing the whole list.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Http`] on network failure or timeout.
    /// - [`UpstreamError::UnexpectedStatus`] on a non-2xx status.
    /// - [`UpstreamError::Deserialize`] if the body is not a JSON array.
    pub async fn fetch_products(&self, token: &str) -> Result<Vec<RawProduct>, UpstreamError> {
        let response = self
            .client
            .get(self.products_url.clone())
            .bearer_auth(token)
            .send()
            .await?;

        let entries: Vec<serde_json::Value> = read_json(response, &self.products_url).await?;
        let received = entries.len();
        let products: Vec<RawProduct> = entries
            .into_iter()
            .filter_map(|v| serde_json::from_value::<RawProduct>(v).ok())
            .collect();

        let skipped = received - products.len();
        if skipped > 0 {
            tracing::warn!(skipped, received, "skipped malformed upstream product entries");
        }
        tracing::debug!(count = products.len(), "fetched upstream products");

        Ok(products)
    }
}

/// Asserts a 2xx status and parses the body as JSON.
async fn read_json<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
        context: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
