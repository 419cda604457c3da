use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::client::MarketplaceClient;
use super::types::{Product, ProductQuery};

/// Products rendered at most
pub const MAX_VISIBLE_PRODUCTS: usize = 21;

/// A search issued by [`ProductBrowser::set_query`], to be run and applied back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: ProductQuery,
}

/// Products returned for one [`SearchRequest`]
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub generation: u64,
    pub products: Vec<Product>,
}

/// What the product list area shows
#[derive(Debug, Clone, PartialEq)]
pub enum ProductListContent<'a> {
    Loading,
    Empty(&'static str),
    Products(&'a [Product]),
}

/// Product list of the marketplace page.
///
/// Every query change bumps the generation; an outcome is applied only if it carries the
/// latest generation, so a slow response can never overwrite a newer one.
pub struct ProductBrowser {
    client: Arc<dyn MarketplaceClient>,
    query: Option<ProductQuery>,
    generation: u64,
    products: Vec<Product>,
    is_loading: bool,
}

impl std::fmt::Debug for ProductBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductBrowser")
            .field("query", &self.query)
            .field("generation", &self.generation)
            .field("products", &self.products.len())
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

impl ProductBrowser {
    pub fn new(client: Arc<dyn MarketplaceClient>) -> Self {
        Self {
            client,
            query: None,
            generation: 0,
            products: Vec::new(),
            is_loading: false,
        }
    }

    /// Start loading for `query`. Returns `None` when nothing changed.
    pub fn set_query(&mut self, query: ProductQuery) -> Option<SearchRequest> {
        if self.query.as_ref() == Some(&query) {
            return None;
        }

        self.generation += 1;
        self.query = Some(query.clone());
        self.products.clear();
        self.is_loading = true;

        debug!(generation = self.generation, term = %query.term, "Product search issued");

        Some(SearchRequest {
            generation: self.generation,
            query,
        })
    }

    /// Run a search detached from the browser. Failures come back as an empty list.
    pub fn search(&self, request: SearchRequest) -> impl Future<Output = SearchOutcome> + Send + 'static {
        let client = self.client.clone();
        async move {
            let products = match client.search(&request.query).await {
                Ok(products) => products,
                Err(e) => {
                    warn!(error = %e, "Marketplace search failed");
                    Vec::new()
                }
            };
            SearchOutcome {
                generation: request.generation,
                products,
            }
        }
    }

    /// Apply a finished search. Returns false for outcomes of superseded requests.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                latest = self.generation,
                "Discarding superseded search results"
            );
            return false;
        }

        self.products = outcome.products;
        self.is_loading = false;
        true
    }

    /// `set_query`, run the search and apply it
    pub async fn load(&mut self, query: ProductQuery) {
        if let Some(request) = self.set_query(query) {
            let outcome = self.search(request).await;
            self.apply(outcome);
        }
    }

    pub fn query(&self) -> Option<&ProductQuery> {
        self.query.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Full result list
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn visible_products(&self) -> &[Product] {
        &self.products[..self.products.len().min(MAX_VISIBLE_PRODUCTS)]
    }

    /// Title above the list, counting every result rather than the visible ones
    pub fn heading(&self) -> String {
        if self.products.is_empty() {
            "Extensions".to_string()
        } else {
            format!("{} extensions", self.products.len())
        }
    }

    pub fn content(&self) -> ProductListContent<'_> {
        if self.is_loading {
            ProductListContent::Loading
        } else if self.products.is_empty() {
            ProductListContent::Empty("No products.")
        } else {
            ProductListContent::Products(self.visible_products())
        }
    }
}
