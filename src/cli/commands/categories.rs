use anyhow::Result;
use std::sync::Arc;
use tracing::Instrument;

use crate::cli::commands::wizard::admin_base_url;
use crate::cli::commands::Command;
use crate::config::config;
use crate::marketplace::{Category, CategorySelector, HttpMarketplaceClient};
use crate::navigation::Query;
use crate::telemetry::{create_marketplace_span, generate_correlation_id};

pub struct CategoriesCommand {
    pub category: Option<String>,
}

impl CategoriesCommand {
    pub fn new() -> Self {
        Self { category: None }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

impl Default for CategoriesCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for CategoriesCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let client = Arc::new(HttpMarketplaceClient::new(&settings.marketplace));
        let mut selector = CategorySelector::new(client);

        println!("🗂️  Loading categories from {}...", settings.marketplace.base_url);

        let correlation_id = generate_correlation_id();
        selector
            .load_categories()
            .instrument(create_marketplace_span("categories", Some(&correlation_id)))
            .await;

        let mut query = Query::for_path("/extensions");
        if let Some(category) = &self.category {
            query = query.with_params(&[("category", category.as_str())]);
        }
        selector.sync_selection(&query);

        if selector.categories().next().is_none() {
            println!("📋 No categories available");
            println!("   💡 Check marketplace.base_url or your network connection");
            return Ok(());
        }

        println!();
        for category in selector.first_batch() {
            print_category(category, "");
        }
        if !selector.second_batch().is_empty() {
            let marker = if selector.is_selected_in_second_batch() { " ●" } else { "" };
            println!("   More{marker}");
            for category in selector.second_batch() {
                print_category(category, "   ");
            }
        }

        println!();
        println!("📱 Mobile label: {}", selector.mobile_dropdown_label());
        if let Some(selected) = selector.selected() {
            let base = admin_base_url(&settings.site.url)?;
            println!("🔗 {}", selector.category_url(&query.to_url(&base), &selected.slug));
        }

        Ok(())
    }
}

fn print_category(category: &Category, indent: &str) {
    let marker = if category.selected { "●" } else { "○" };
    println!("   {indent}{marker} {} ({})", category.label, category.slug);
}
