use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::wizard::ThemeCard;

/// Main configuration structure for wc-admin
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WcAdminConfig {
    /// Store site the wizard talks to
    pub site: SiteConfig,
    /// Remote extensions catalog
    pub marketplace: MarketplaceConfig,
    /// Customize-store wizard settings
    pub wizard: WizardConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the store, e.g. https://example.com
    pub url: String,
    /// User for REST calls (application passwords)
    pub username: Option<String>,
    /// Application password (can be set via env var)
    pub application_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Catalog host serving the wccom-extensions API
    pub base_url: String,
    /// Country sent with product searches
    pub country: Option<String>,
    /// Locale sent with product searches
    pub locale: Option<String>,
    /// How long the category list is reused, in seconds
    pub category_cache_ttl_seconds: u64,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
    /// Per-request timeout, in milliseconds
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Delay between marking the task complete and showing the transitional screen
    pub site_preview_delay_ms: u64,
    /// Screenshot service used to refresh the site preview image
    pub preview_service_url: String,
    /// Themes offered on the intro screen
    pub theme_cards: Vec<ThemeCard>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json_logs: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8888".to_string(),
            username: None,
            application_password: None, // Will be read from env var
        }
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://woocommerce.com".to_string(),
            country: None,
            locale: None,
            category_cache_ttl_seconds: 3600,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            site_preview_delay_ms: 5000,
            preview_service_url: "https://s0.wp.com/mshots/v1".to_string(),
            theme_cards: default_theme_cards(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for WcAdminConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            marketplace: MarketplaceConfig::default(),
            wizard: WizardConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_theme_cards() -> Vec<ThemeCard> {
    [
        ("twentytwentythree", "Twenty Twenty-Three"),
        ("tsubaki", "Tsubaki"),
        ("tazza", "Tazza"),
        ("amulet", "Amulet"),
    ]
    .into_iter()
    .map(|(slug, name)| ThemeCard {
        slug: slug.to_string(),
        name: name.to_string(),
        image: format!("https://i0.wp.com/s2.wp.com/wp-content/themes/pub/{slug}/screenshot.png"),
        link: Some(format!("https://wordpress.com/theme/{slug}")),
        is_active: false,
    })
    .collect()
}

impl RateLimitConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl WizardConfig {
    pub fn site_preview_delay(&self) -> Duration {
        Duration::from_millis(self.site_preview_delay_ms)
    }
}

impl WcAdminConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (wc-admin.toml, .wc-admin-rc)
    /// 3. Environment variables (prefixed with WC_ADMIN__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`WcAdminConfig::load`], looking for configuration files in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_path = dir.join("wc-admin.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".wc-admin-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        // Double underscore keeps field names like `base_url` intact
        builder = builder.add_source(
            Environment::with_prefix("WC_ADMIN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut wc_admin_config: WcAdminConfig = config.try_deserialize()?;

        // Special handling for the application password - check the short variable too
        if wc_admin_config.site.application_password.is_none() {
            if let Ok(password) = std::env::var("WC_ADMIN_APP_PASSWORD") {
                wc_admin_config.site.application_password = Some(password);
            }
        }

        Ok(wc_admin_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<WcAdminConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = WcAdminConfig::load_env_file();
        WcAdminConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static WcAdminConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
