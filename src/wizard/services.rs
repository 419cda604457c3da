// Asynchronous services invoked by the wizard; the controller only sees the trait

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{SiteConfig, WizardConfig};
use crate::http::{HttpError, RateLimitedHttpClient};

use super::types::ThemeCard;

/// Option flipped once the customize-store task is done
pub const TASK_COMPLETED_OPTION: &str = "woocommerce_admin_customize_store_completed";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("{0}")]
    Other(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WizardServices: Send + Sync {
    /// Themes for the intro screen, the active one flagged
    async fn fetch_theme_cards(&self) -> Result<Vec<ThemeCard>, ServiceError>;

    /// Record that the customize-store task is complete
    async fn mark_task_complete(&self) -> Result<(), ServiceError>;

    /// Ask the screenshot service to refresh the site preview
    async fn prefetch_site_preview(&self) -> Result<(), ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ActiveTheme {
    stylesheet: String,
}

/// Services backed by the store's REST API
#[derive(Debug, Clone)]
pub struct RestWizardServices {
    http: RateLimitedHttpClient,
    site_url: String,
    credentials: Option<(String, String)>,
    theme_cards: Vec<ThemeCard>,
    preview_service_url: String,
}

impl RestWizardServices {
    pub fn new(site: &SiteConfig, wizard: &WizardConfig, http: RateLimitedHttpClient) -> Self {
        let credentials = match (&site.username, &site.application_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };

        Self {
            http,
            site_url: site.url.trim_end_matches('/').to_string(),
            credentials,
            theme_cards: wizard.theme_cards.clone(),
            preview_service_url: wizard.preview_service_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.request(method, url);
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    async fn active_theme(&self) -> Result<Option<String>, ServiceError> {
        if self.credentials.is_none() {
            debug!("No site credentials, skipping active theme lookup");
            return Ok(None);
        }

        let url = format!("{}/wp-json/wp/v2/themes?status=active", self.site_url);
        let response = self.http.send(&url, self.authorized(Method::GET, &url)).await?;
        let themes: Vec<ActiveTheme> = response
            .json()
            .await
            .map_err(|source| HttpError::Decode { url: url.clone(), source })?;

        Ok(themes.into_iter().next().map(|theme| theme.stylesheet))
    }
}

#[async_trait]
impl WizardServices for RestWizardServices {
    async fn fetch_theme_cards(&self) -> Result<Vec<ThemeCard>, ServiceError> {
        let active = self.active_theme().await?;

        let cards = self
            .theme_cards
            .iter()
            .cloned()
            .map(|mut card| {
                card.is_active = active.as_deref() == Some(card.slug.as_str());
                card
            })
            .collect();

        Ok(cards)
    }

    async fn mark_task_complete(&self) -> Result<(), ServiceError> {
        let url = format!("{}/wp-json/wc-admin/options", self.site_url);
        let request = self
            .authorized(Method::POST, &url)
            .json(&json!({ TASK_COMPLETED_OPTION: "yes" }));

        self.http.send(&url, request).await?;
        info!(option = TASK_COMPLETED_OPTION, "Customize store task marked complete");
        Ok(())
    }

    async fn prefetch_site_preview(&self) -> Result<(), ServiceError> {
        let encoded: String = url::form_urlencoded::byte_serialize(self.site_url.as_bytes()).collect();
        let url = format!("{}/{}?vpw=1200&vph=1000&w=800", self.preview_service_url, encoded);

        self.http.send(&url, self.http.request(Method::GET, &url)).await?;
        debug!(url = %url, "Site preview prefetched");
        Ok(())
    }
}

/// Services that never leave the process: configured theme cards, no active theme
#[derive(Debug, Clone, Default)]
pub struct OfflineWizardServices {
    theme_cards: Vec<ThemeCard>,
}

impl OfflineWizardServices {
    pub fn new(theme_cards: Vec<ThemeCard>) -> Self {
        Self { theme_cards }
    }
}

#[async_trait]
impl WizardServices for OfflineWizardServices {
    async fn fetch_theme_cards(&self) -> Result<Vec<ThemeCard>, ServiceError> {
        Ok(self.theme_cards.clone())
    }

    async fn mark_task_complete(&self) -> Result<(), ServiceError> {
        debug!("Offline, task completion not recorded");
        Ok(())
    }

    async fn prefetch_site_preview(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn services(server: &MockServer, with_credentials: bool) -> RestWizardServices {
        let site = SiteConfig {
            url: server.uri(),
            username: with_credentials.then(|| "admin".to_string()),
            application_password: with_credentials.then(|| "app-pass".to_string()),
        };
        let wizard = WizardConfig {
            preview_service_url: format!("{}/mshots/v1", server.uri()),
            ..WizardConfig::default()
        };
        let http = RateLimitedHttpClient::new(&RateLimitConfig::default(), Duration::from_secs(1));
        RestWizardServices::new(&site, &wizard, http)
    }

    #[tokio::test]
    async fn test_fetch_theme_cards_flags_active_theme() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/themes"))
            .and(query_param("status", "active"))
            .and(basic_auth("admin", "app-pass"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"stylesheet": "tsubaki"}])))
            .mount(&server)
            .await;

        let cards = services(&server, true).fetch_theme_cards().await.unwrap();
        let active: Vec<_> = cards.iter().filter(|c| c.is_active).map(|c| c.slug.as_str()).collect();
        assert_eq!(active, vec!["tsubaki"]);
    }

    #[tokio::test]
    async fn test_fetch_theme_cards_without_credentials_skips_lookup() {
        let server = MockServer::start().await;
        let cards = services(&server, false).fetch_theme_cards().await.unwrap();
        assert!(!cards.is_empty());
        assert!(cards.iter().all(|c| !c.is_active));
    }

    #[tokio::test]
    async fn test_mark_task_complete_posts_option() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wc-admin/options"))
            .and(body_json(json!({ TASK_COMPLETED_OPTION: "yes" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        services(&server, true).mark_task_complete().await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_task_complete_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wc-admin/options"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = services(&server, true).mark_task_complete().await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(HttpError::Status { .. })));
    }
}
