use serde::{Deserialize, Serialize};

use crate::navigation::Query;

/// Slug of the catch-all category the catalog returns
pub const ALL_CATEGORY: &str = "_all";

/// Category as served by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryApiItem {
    pub slug: String,
    pub label: String,
}

/// Category shown in the selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub label: String,
    pub selected: bool,
}

impl From<CategoryApiItem> for Category {
    fn from(item: CategoryApiItem) -> Self {
        Self {
            slug: item.slug,
            label: item.label,
            selected: false,
        }
    }
}

/// One extension from the catalog search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub title: String,
    pub image: String,
    pub excerpt: String,
    pub link: String,
    pub demo_url: String,
    pub price: String,
    pub hash: String,
    pub slug: String,
    pub id: u64,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub vendor_name: String,
    pub vendor_url: String,
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Parameters of a catalog search. Any change triggers a new request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    pub term: String,
    pub category: Option<String>,
    pub country: String,
    pub locale: String,
}

impl ProductQuery {
    /// Read `term` and `category` from the location; country and locale come from the store
    pub fn from_location(query: &Query, country: Option<&str>, locale: Option<&str>) -> Self {
        Self {
            term: query.get("term").unwrap_or_default().to_string(),
            category: query.get("category").map(str::to_string),
            country: country.unwrap_or_default().to_string(),
            locale: locale.unwrap_or_default().to_string(),
        }
    }
}
