use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::MarketplaceConfig;
use crate::http::{HttpError, RateLimitedHttpClient};

use super::types::{CategoryApiItem, Product, ProductQuery, SearchResponse};

const EXTENSIONS_API: &str = "wp-json/wccom-extensions/1.0";
const CATEGORIES_CACHE_KEY: &str = "marketplace:categories";

#[derive(Debug, Error)]
pub enum MarketplaceError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid catalog url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Read access to the remote extensions catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    async fn categories(&self) -> Result<Vec<CategoryApiItem>, MarketplaceError>;

    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, MarketplaceError>;
}

/// Catalog client over HTTP. The category list is cached; searches always hit the catalog.
#[derive(Debug, Clone)]
pub struct HttpMarketplaceClient {
    http: RateLimitedHttpClient,
    base_url: String,
}

impl HttpMarketplaceClient {
    pub fn new(settings: &MarketplaceConfig) -> Self {
        let http = RateLimitedHttpClient::new(
            &settings.rate_limit,
            Duration::from_secs(settings.category_cache_ttl_seconds),
        );
        Self::with_http(&settings.base_url, http)
    }

    pub fn with_http(base_url: &str, http: RateLimitedHttpClient) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url, MarketplaceError> {
        let url = format!("{}/{}/{}", self.base_url, EXTENSIONS_API, name);
        Url::parse(&url).map_err(|source| MarketplaceError::InvalidUrl { url, source })
    }

    /// Search URL; `category` is only sent when set
    pub fn search_url(&self, query: &ProductQuery) -> Result<Url, MarketplaceError> {
        let mut url = self.endpoint("search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("term", &query.term)
                .append_pair("country", &query.country)
                .append_pair("locale", &query.locale);
            if let Some(category) = &query.category {
                pairs.append_pair("category", category);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl MarketplaceClient for HttpMarketplaceClient {
    async fn categories(&self) -> Result<Vec<CategoryApiItem>, MarketplaceError> {
        let url = self.endpoint("categories")?;
        let categories: Vec<CategoryApiItem> = self
            .http
            .get_json(url.as_str(), Some(CATEGORIES_CACHE_KEY))
            .await?;

        info!(count = categories.len(), "Fetched marketplace categories");
        Ok(categories)
    }

    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, MarketplaceError> {
        let url = self.search_url(query)?;
        debug!(url = %url, "Searching marketplace");

        let response: SearchResponse = self.http.get_json(url.as_str(), None).await?;
        Ok(response.products)
    }
}
