use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::navigation::{Location, Query};

use super::client::MarketplaceClient;
use super::types::{Category, ALL_CATEGORY};

/// Categories shown inline before the rest go behind "More"
pub const FIRST_BATCH_SIZE: usize = 7;
pub const CATEGORY_PARAM: &str = "category";

const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// Issued by [`CategorySelector::begin_load`]; pass it to [`CategorySelector::fetch`]
#[derive(Debug)]
pub struct CategoryRequest(());

/// Categories fetched for one [`CategoryRequest`]
#[derive(Debug, Clone)]
pub struct CategoriesLoaded {
    pub categories: Vec<Category>,
}

/// Category filter of the marketplace page
pub struct CategorySelector {
    client: Arc<dyn MarketplaceClient>,
    first_batch: Vec<Category>,
    second_batch: Vec<Category>,
    selected: Option<String>,
    requested: Option<String>,
    loaded: bool,
    is_loading: bool,
}

impl std::fmt::Debug for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySelector")
            .field("first_batch", &self.first_batch)
            .field("second_batch", &self.second_batch)
            .field("selected", &self.selected)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl CategorySelector {
    pub fn new(client: Arc<dyn MarketplaceClient>) -> Self {
        Self {
            client,
            first_batch: Vec::new(),
            second_batch: Vec::new(),
            selected: None,
            requested: None,
            loaded: false,
            is_loading: false,
        }
    }

    /// Mark the list as loading. Returns `None` once loaded or while a fetch is in flight.
    pub fn begin_load(&mut self) -> Option<CategoryRequest> {
        if self.loaded || self.is_loading {
            return None;
        }

        self.is_loading = true;
        debug!("Category fetch issued");
        Some(CategoryRequest(()))
    }

    /// Fetch the list detached from the selector. A failed fetch comes back empty.
    pub fn fetch(&self, _request: CategoryRequest) -> impl Future<Output = CategoriesLoaded> + Send + 'static {
        let client = self.client.clone();
        async move {
            let categories = match client.categories().await {
                Ok(items) => items.into_iter().map(Category::from).collect(),
                Err(e) => {
                    warn!(error = %e, "Could not load marketplace categories");
                    Vec::new()
                }
            };
            CategoriesLoaded { categories }
        }
    }

    /// Split a fetched list into the inline and "More" batches
    pub fn apply(&mut self, loaded: CategoriesLoaded) {
        let mut categories = loaded.categories;

        // Stable: only `_all` moves
        categories.sort_by_key(|category| category.slug != ALL_CATEGORY);

        let split = categories.len().min(FIRST_BATCH_SIZE);
        self.second_batch = categories.split_off(split);
        self.first_batch = categories;
        self.loaded = true;
        self.is_loading = false;

        debug!(
            inline = self.first_batch.len(),
            overflow = self.second_batch.len(),
            "Categories loaded"
        );

        if let Some(slug) = self.requested.clone() {
            self.select(&slug);
        }
    }

    /// Fetch the category list, once per selector
    pub async fn load_categories(&mut self) {
        if let Some(request) = self.begin_load() {
            let loaded = self.fetch(request).await;
            self.apply(loaded);
        }
    }

    /// Follow the `category` parameter of the location, `_all` when absent
    pub fn sync_selection(&mut self, query: &Query) {
        let slug = query.get(CATEGORY_PARAM).unwrap_or(ALL_CATEGORY).to_string();
        self.select(&slug);
        self.requested = Some(slug);
    }

    fn select(&mut self, slug: &str) {
        // Unknown slugs keep whatever was selected before
        if !self.categories().any(|category| category.slug == slug) {
            return;
        }

        self.selected = Some(slug.to_string());
        for category in self.first_batch.iter_mut().chain(self.second_batch.iter_mut()) {
            category.selected = category.slug == slug;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn first_batch(&self) -> &[Category] {
        &self.first_batch
    }

    pub fn second_batch(&self) -> &[Category] {
        &self.second_batch
    }

    /// Both batches in display order, as listed by the mobile dropdown
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.first_batch.iter().chain(self.second_batch.iter())
    }

    pub fn selected(&self) -> Option<&Category> {
        let slug = self.selected.as_deref()?;
        self.categories().find(|category| category.slug == slug)
    }

    /// Whether the "More" control should render as selected
    pub fn is_selected_in_second_batch(&self) -> bool {
        self.selected
            .as_deref()
            .is_some_and(|slug| self.second_batch.iter().any(|category| category.slug == slug))
    }

    pub fn mobile_dropdown_label(&self) -> &str {
        match self.selected() {
            Some(category) if category.label != "All" => &category.label,
            _ => ALL_CATEGORIES_LABEL,
        }
    }

    /// Link target for a category: the current location with `category` replaced
    pub fn category_url(&self, current: &Url, slug: &str) -> Url {
        Query::parse(current)
            .with_params(&[(CATEGORY_PARAM, slug)])
            .to_url(current)
    }

    /// Navigate to a category and select it
    pub fn choose(&mut self, location: &dyn Location, slug: &str) {
        location.navigate_to_params(&[(CATEGORY_PARAM, slug)]);
        self.sync_selection(&location.query());
    }
}
