// Marketplace page: category filter and product list backed by the extensions catalog

pub mod categories;
pub mod client;
pub mod page;
pub mod products;
pub mod types;

pub use categories::{CategoriesLoaded, CategoryRequest, CategorySelector, FIRST_BATCH_SIZE};
pub use client::{HttpMarketplaceClient, MarketplaceClient, MarketplaceError};
pub use page::MarketplacePage;
pub use products::{ProductBrowser, ProductListContent, SearchOutcome, SearchRequest, MAX_VISIBLE_PRODUCTS};
pub use types::{Category, CategoryApiItem, Product, ProductQuery, ALL_CATEGORY};
