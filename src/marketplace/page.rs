use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::navigation::{Location, NavigationChange};

use super::categories::CategorySelector;
use super::client::MarketplaceClient;
use super::products::ProductBrowser;
use super::types::ProductQuery;

/// Marketplace page bound to a location.
///
/// The category selection and the product query are both derived from the location, so
/// every history change re-syncs the selector and reissues the search.
pub struct MarketplacePage {
    location: Arc<dyn Location>,
    changes: broadcast::Receiver<NavigationChange>,
    categories: CategorySelector,
    products: ProductBrowser,
    country: Option<String>,
    locale: Option<String>,
}

impl std::fmt::Debug for MarketplacePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplacePage")
            .field("url", &self.location.current_url().as_str())
            .field("categories", &self.categories)
            .field("products", &self.products)
            .finish()
    }
}

impl MarketplacePage {
    pub fn new(client: Arc<dyn MarketplaceClient>, location: Arc<dyn Location>) -> Self {
        let changes = location.subscribe();
        Self {
            location,
            changes,
            categories: CategorySelector::new(client.clone()),
            products: ProductBrowser::new(client),
            country: None,
            locale: None,
        }
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    /// Bring the selector and product list in line with the current location
    pub async fn refresh(&mut self) {
        let query = self.location.query();
        debug!(url = %self.location.current_url(), "Refreshing marketplace page");

        self.categories.sync_selection(&query);
        self.categories.load_categories().await;

        let search = ProductQuery::from_location(&query, self.country.as_deref(), self.locale.as_deref());
        self.products.load(search).await;
    }

    /// Wait for the next history change and refresh. Returns false once the location is gone.
    pub async fn follow_next_change(&mut self) -> bool {
        match self.changes.recv().await {
            Ok(change) => {
                debug!(url = %change.url, "Marketplace location changed");
            }
            Err(RecvError::Lagged(skipped)) => {
                // The refresh reads the latest url anyway
                warn!(skipped, "History notifications lagged");
            }
            Err(RecvError::Closed) => return false,
        }
        self.refresh().await;
        true
    }

    /// Follow history changes until the location goes away
    pub async fn run(&mut self) {
        while self.follow_next_change().await {}
    }

    /// Navigate to a category. Pushing does not notify, so the page refreshes itself.
    pub async fn choose_category(&mut self, slug: &str) {
        self.categories.choose(self.location.as_ref(), slug);
        self.refresh().await;
    }

    pub fn categories(&self) -> &CategorySelector {
        &self.categories
    }

    pub fn products(&self) -> &ProductBrowser {
        &self.products
    }

    pub fn location(&self) -> &Arc<dyn Location> {
        &self.location
    }
}
