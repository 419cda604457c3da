use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

use crate::cli::commands::Command;
use crate::config::{config, WcAdminConfig};
use crate::http::RateLimitedHttpClient;
use crate::navigation::{parse_admin_url, Location, MemoryHistory};
use crate::telemetry::{create_wizard_span, generate_correlation_id};
use crate::wizard::{
    OfflineWizardServices, RestWizardServices, WizardController, WizardEvent, WizardServices,
};

pub struct WizardCommand {
    pub path: String,
    pub events: Vec<String>,
    pub offline: bool,
    pub json: bool,
}

impl WizardCommand {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            events: Vec::new(),
            offline: false,
            json: false,
        }
    }

    pub fn with_events(mut self, events: Vec<String>) -> Self {
        self.events = events;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn services(&self, settings: &WcAdminConfig) -> Arc<dyn WizardServices> {
        if self.offline {
            return Arc::new(OfflineWizardServices::new(settings.wizard.theme_cards.clone()));
        }
        let http = RateLimitedHttpClient::new(&settings.marketplace.rate_limit, Duration::from_secs(60));
        Arc::new(RestWizardServices::new(&settings.site, &settings.wizard, http))
    }

    async fn replay(&self, settings: &WcAdminConfig, events: Vec<WizardEvent>) -> Result<()> {
        let base = admin_base_url(&settings.site.url)?;
        let start = parse_admin_url(&base, &self.path)?;
        let location = Arc::new(MemoryHistory::new(start));

        let mut wizard = WizardController::new(&settings.wizard, self.services(settings), location.clone());
        wizard.start();
        wizard.settle().await;

        if !self.json {
            println!("🧭 Resolved {} → {}", self.path, wizard.step());
        }

        for event in events {
            if wizard.is_finished() {
                if !self.json {
                    println!("🏁 Wizard already finished, skipping {}", event.name());
                }
                continue;
            }

            let name = event.name();
            let taken = wizard.dispatch(event);
            if wizard.step().is_awaiting() && !self.json {
                println!("   ⏳ {} waiting...", wizard.step());
            }
            wizard.settle().await;

            if !self.json {
                if taken {
                    println!("   ✅ {} → {}", name, wizard.step());
                } else {
                    println!("   ➖ {} ignored in {}", name, wizard.step());
                }
            }
        }

        if self.json {
            let report = json!({
                "step": wizard.step().to_string(),
                "screen": wizard.screen(),
                "css_class": wizard.css_class(),
                "url": location.current_url().to_string(),
                "context": wizard.context(),
                "history": wizard.history(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!();
        println!("📍 STEP: {}", wizard.step());
        match wizard.screen() {
            Some(screen) => println!("   🖼️  Screen: {screen}"),
            None => println!("   🖼️  Screen: (none)"),
        }
        println!("   🎨 Class: {}", wizard.css_class());
        println!("   🔗 URL: {}", location.current_url());

        let intro = &wizard.context().intro;
        if !intro.theme_cards.is_empty() {
            let slugs: Vec<&str> = intro.theme_cards.iter().map(|card| card.slug.as_str()).collect();
            println!("   🎭 Theme cards: {}", slugs.join(", "));
        }
        if !intro.active_theme.is_empty() {
            println!("   ⭐ Active theme: {}", intro.active_theme);
        }
        if let Some(theme) = &intro.selected_theme {
            println!("   👉 Selected theme: {theme}");
        }

        println!();
        println!("📜 TRANSITIONS:");
        for record in wizard.history() {
            println!(
                "   {} {} → {} ({} ms)",
                record.timestamp.format("%H:%M:%S%.3f"),
                record.from,
                record.to,
                record.duration_ms
            );
        }

        Ok(())
    }
}

impl Command for WizardCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let events = self
            .events
            .iter()
            .map(|raw| parse_event(raw))
            .collect::<Result<Vec<_>>>()?;

        let correlation_id = generate_correlation_id();
        let span = create_wizard_span(&self.path, &correlation_id);
        self.replay(settings, events).instrument(span).await
    }
}

/// `admin.php` of the configured store
pub fn admin_base_url(site_url: &str) -> Result<Url> {
    let url = format!("{}/wp-admin/admin.php", site_url.trim_end_matches('/'));
    Url::parse(&url).with_context(|| format!("Invalid site url {site_url:?}"))
}

/// Accept `NAME` for payload-free events, JSON for the rest
pub fn parse_event(raw: &str) -> Result<WizardEvent> {
    let raw = raw.trim();
    if raw.starts_with('{') {
        return serde_json::from_str(raw).with_context(|| format!("Invalid event JSON: {raw}"));
    }
    WizardEvent::from_name(&raw.to_ascii_uppercase())
        .ok_or_else(|| anyhow!("Unknown event {raw:?} (events with a payload must be given as JSON)"))
}
