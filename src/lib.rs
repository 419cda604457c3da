// wc-admin library - customize-store wizard and marketplace browser
// This exposes the core components for the CLI and for testing

pub mod cli;
pub mod config;
pub mod http;
pub mod marketplace;
pub mod navigation;
pub mod telemetry;
pub mod wizard;

// Re-export key types for easy access
pub use config::{config, init_config, WcAdminConfig};
pub use http::{HttpError, RateLimitedHttpClient};
pub use marketplace::{
    CategorySelector, HttpMarketplaceClient, MarketplaceClient, MarketplaceError, MarketplacePage,
    ProductBrowser, ProductQuery,
};
pub use navigation::{Location, MemoryHistory, NavigationError, Query, UrlBridge};
pub use telemetry::{create_marketplace_span, create_wizard_span, generate_correlation_id, init_telemetry};
pub use wizard::{Screen, ServiceError, Step, WizardController, WizardEvent, WizardServices};
