use anyhow::Result;
use std::sync::Arc;
use tracing::Instrument;

use crate::cli::commands::Command;
use crate::config::config;
use crate::marketplace::{HttpMarketplaceClient, ProductBrowser, ProductListContent, ProductQuery};
use crate::telemetry::{create_marketplace_span, generate_correlation_id};

pub struct SearchCommand {
    pub term: String,
    pub category: Option<String>,
    pub country: Option<String>,
    pub locale: Option<String>,
}

impl SearchCommand {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            category: None,
            country: None,
            locale: None,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }

    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }
}

impl Command for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let client = Arc::new(HttpMarketplaceClient::new(&settings.marketplace));
        let mut browser = ProductBrowser::new(client);

        let query = ProductQuery {
            term: self.term.clone(),
            category: self.category.clone().filter(|c| !c.is_empty()),
            country: self
                .country
                .clone()
                .or_else(|| settings.marketplace.country.clone())
                .unwrap_or_default(),
            locale: self
                .locale
                .clone()
                .or_else(|| settings.marketplace.locale.clone())
                .unwrap_or_default(),
        };

        println!("🔎 Searching marketplace for {:?}...", query.term);

        let correlation_id = generate_correlation_id();
        browser
            .load(query)
            .instrument(create_marketplace_span("search", Some(&correlation_id)))
            .await;

        println!();
        println!("📦 {}", browser.heading());
        match browser.content() {
            ProductListContent::Loading => println!("   ⏳ Loading..."),
            ProductListContent::Empty(message) => println!("   {message}"),
            ProductListContent::Products(products) => {
                for product in products {
                    let vendor = if product.vendor_name.is_empty() {
                        String::new()
                    } else {
                        format!(" by {}", product.vendor_name)
                    };
                    let price = if product.price.is_empty() { "-" } else { product.price.as_str() };
                    println!("   • {}{} [{}]", product.title, vendor, price);
                }
                let hidden = browser.products().len() - products.len();
                if hidden > 0 {
                    println!("   … and {hidden} more");
                }
            }
        }

        Ok(())
    }
}
