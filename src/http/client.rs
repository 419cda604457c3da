use governor::{
    RateLimiter,
    Quota,
    DefaultDirectRateLimiter,
    Jitter
};
use moka::future::Cache;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RateLimitConfig;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response shape from {url}: {source}")]
    Shape {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rate-limited HTTP client with an optional per-request JSON cache
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    client: Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, serde_json::Value>,
}

impl RateLimitedHttpClient {
    /// Create a new rate-limited HTTP client
    pub fn new(limits: &RateLimitConfig, cache_ttl: Duration) -> Self {
        let per_second = NonZeroU32::new(limits.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(limits.burst_capacity).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(cache_ttl)
            .build();

        let client = Client::builder()
            .timeout(limits.request_timeout())
            .build()
            .unwrap_or_else(|error| {
                warn!(error = %error, "Could not build HTTP client with a timeout, using defaults");
                Client::new()
            });

        Self {
            client,
            rate_limiter,
            cache,
        }
    }

    /// Start a request; send it with [`RateLimitedHttpClient::send`]
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request once the rate limiter allows it, failing on non-2xx statuses
    pub async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, HttpError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        debug!(url = %url, "Sending HTTP request");

        let response = request.send().await.map_err(|source| HttpError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }

    /// GET a JSON document, reusing a cached copy when `cache_key` is given and still fresh
    pub async fn get_json<T>(&self, url: &str, cache_key: Option<&str>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        if let Some(key) = cache_key {
            if let Some(cached) = self.cache.get(key).await {
                debug!("Cache hit for key: {}", key);
                if let Ok(value) = serde_json::from_value(cached) {
                    return Ok(value);
                }
            }
        }

        let response = self.send(url, self.client.get(url)).await?;
        let body: serde_json::Value = response.json().await.map_err(|source| HttpError::Decode {
            url: url.to_string(),
            source,
        })?;

        let value = serde_json::from_value(body.clone()).map_err(|source| HttpError::Shape {
            url: url.to_string(),
            source,
        })?;

        if let Some(key) = cache_key {
            self.cache.insert(key.to_string(), body).await;
            debug!("Cached response for future requests");
        }

        Ok(value)
    }

    /// Clear cache (useful for testing or after write operations)
    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        info!("HTTP client cache cleared");
    }
}
