//! Marketplace catalog tests against a wiremock server
//!
//! Covers the category selector and product browser end to end over HTTP, including the
//! failure modes that must degrade to empty lists.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wc_admin::config::RateLimitConfig;
use url::Url;
use wc_admin::marketplace::{
    CategorySelector, HttpMarketplaceClient, MarketplaceClient, MarketplacePage, ProductBrowser,
    ProductListContent, ProductQuery,
};
use wc_admin::navigation::{Location, MemoryHistory, Query};
use wc_admin::RateLimitedHttpClient;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATEGORIES_PATH: &str = "/wp-json/wccom-extensions/1.0/categories";
const SEARCH_PATH: &str = "/wp-json/wccom-extensions/1.0/search";

/// Extensions catalog mock server
struct CatalogApiMock {
    server: MockServer,
}

impl CatalogApiMock {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn client(&self) -> Arc<dyn MarketplaceClient> {
        self.client_with_timeout(Duration::from_secs(10))
    }

    fn client_with_timeout(&self, timeout: Duration) -> Arc<dyn MarketplaceClient> {
        let limits = RateLimitConfig {
            requests_per_second: 100,
            burst_capacity: 100,
            request_timeout_ms: timeout.as_millis() as u64,
        };
        let http = RateLimitedHttpClient::new(&limits, Duration::from_secs(60));
        Arc::new(HttpMarketplaceClient::with_http(&self.server.uri(), http))
    }

    async fn mock_categories(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(CATEGORIES_PATH))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    async fn mock_search(&self, term: &str, products: usize, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("term", term))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "products": products_json(products, term) }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }
}

fn products_json(count: usize, term: &str) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "title": format!("{term} extension {i}"),
                "image": "",
                "excerpt": "",
                "link": format!("https://woocommerce.com/products/ext-{i}/"),
                "demo_url": "",
                "price": "&#36;79.00",
                "hash": format!("hash-{i}"),
                "slug": format!("ext-{i}"),
                "id": i,
                "rating": null,
                "reviews_count": null,
                "vendor_name": "Woo",
                "vendor_url": "https://woocommerce.com/",
                "icon": ""
            })
        })
        .collect()
}

fn nine_categories() -> Value {
    json!([
        {"slug": "payments", "label": "Payments"},
        {"slug": "shipping-delivery-and-fulfillment", "label": "Shipping, delivery, and fulfillment"},
        {"slug": "marketing-extensions", "label": "Marketing"},
        {"slug": "_all", "label": "All"},
        {"slug": "operations", "label": "Store management"},
        {"slug": "merchandising", "label": "Merchandising"},
        {"slug": "free-extensions", "label": "Free"},
        {"slug": "developed-by-woo", "label": "Developed by Woo"},
        {"slug": "product-content", "label": "Product content"}
    ])
}

fn search(term: &str) -> ProductQuery {
    ProductQuery {
        term: term.to_string(),
        country: "US".to_string(),
        locale: "en_US".to_string(),
        ..ProductQuery::default()
    }
}

#[tokio::test]
async fn test_nine_categories_split_seven_and_two() {
    let mock = CatalogApiMock::new().await;
    mock.mock_categories(ResponseTemplate::new(200).set_body_json(nine_categories()))
        .await;

    let mut selector = CategorySelector::new(mock.client());
    selector.load_categories().await;

    assert_eq!(selector.first_batch().len(), 7);
    assert_eq!(selector.second_batch().len(), 2);
    assert_eq!(selector.first_batch()[0].slug, "_all");
    assert_eq!(selector.first_batch()[1].slug, "payments");
    assert_eq!(selector.second_batch()[1].slug, "product-content");
}

#[tokio::test]
async fn test_server_error_yields_empty_category_list() {
    let mock = CatalogApiMock::new().await;
    mock.mock_categories(ResponseTemplate::new(500)).await;

    let mut selector = CategorySelector::new(mock.client());
    let request = selector.begin_load().expect("first load");
    assert!(selector.is_loading());

    let loaded = selector.fetch(request).await;
    assert!(selector.is_loading());
    selector.apply(loaded);

    assert!(selector.first_batch().is_empty());
    assert!(selector.second_batch().is_empty());
    assert!(!selector.is_loading());
}

#[tokio::test]
async fn test_hung_catalog_yields_empty_category_list() {
    let mock = CatalogApiMock::new().await;
    mock.mock_categories(
        ResponseTemplate::new(200)
            .set_body_json(nine_categories())
            .set_delay(Duration::from_secs(30)),
    )
    .await;

    let mut selector = CategorySelector::new(mock.client_with_timeout(Duration::from_millis(200)));
    tokio::time::timeout(Duration::from_secs(5), selector.load_categories())
        .await
        .expect("load should give up once the request times out");

    assert_eq!(selector.categories().count(), 0);
    assert!(!selector.is_loading());
}

#[tokio::test]
async fn test_hung_search_shows_no_products() {
    let mock = CatalogApiMock::new().await;
    mock.mock_search("slow", 4, Duration::from_secs(30)).await;

    let mut browser = ProductBrowser::new(mock.client_with_timeout(Duration::from_millis(200)));
    tokio::time::timeout(Duration::from_secs(5), browser.load(search("slow")))
        .await
        .expect("search should give up once the request times out");

    assert!(!browser.is_loading());
    assert_eq!(browser.content(), ProductListContent::Empty("No products."));
}

#[tokio::test]
async fn test_malformed_categories_yield_empty_list() {
    let mock = CatalogApiMock::new().await;
    mock.mock_categories(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .await;

    let mut selector = CategorySelector::new(mock.client());
    selector.load_categories().await;

    assert_eq!(selector.categories().count(), 0);
}

#[tokio::test]
async fn test_empty_term_with_thirty_products_shows_twenty_one() {
    let mock = CatalogApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("term", ""))
        .and(query_param("country", "US"))
        .and(query_param("locale", "en_US"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": products_json(30, "") })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let mut browser = ProductBrowser::new(mock.client());
    browser.load(search("")).await;

    assert_eq!(browser.visible_products().len(), 21);
    assert_eq!(browser.heading(), "30 extensions");
    match browser.content() {
        ProductListContent::Products(products) => assert_eq!(products.len(), 21),
        other => panic!("expected products, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_failure_shows_no_products() {
    let mock = CatalogApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock.server)
        .await;

    let mut browser = ProductBrowser::new(mock.client());
    browser.load(search("anything")).await;

    assert!(!browser.is_loading());
    assert_eq!(browser.heading(), "Extensions");
    assert_eq!(browser.content(), ProductListContent::Empty("No products."));
}

#[tokio::test]
async fn test_slow_stale_search_does_not_overwrite_newer_results() {
    let mock = CatalogApiMock::new().await;
    mock.mock_search("pay", 3, Duration::from_millis(300)).await;
    mock.mock_search("payments", 8, Duration::ZERO).await;

    let mut browser = ProductBrowser::new(mock.client());
    let first = browser.set_query(search("pay")).expect("new query");
    let second = browser.set_query(search("payments")).expect("new query");

    let slow = tokio::spawn(browser.search(first));
    let fast = tokio::spawn(browser.search(second));

    // Newer response arrives first, the older one lands afterwards
    assert!(browser.apply(fast.await.unwrap()));
    assert!(!browser.apply(slow.await.unwrap()));

    assert_eq!(browser.products().len(), 8);
    assert!(browser.products()[0].title.starts_with("payments"));
}

#[tokio::test]
async fn test_category_filter_is_sent_when_set() {
    let mock = CatalogApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("category", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": products_json(2, "gateway") })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let mut browser = ProductBrowser::new(mock.client());
    browser
        .load(ProductQuery {
            category: Some("payments".to_string()),
            ..search("gateway")
        })
        .await;

    assert_eq!(browser.products().len(), 2);
}

#[tokio::test]
async fn test_page_follows_history_back_to_previous_category() {
    let mock = CatalogApiMock::new().await;
    mock.mock_categories(ResponseTemplate::new(200).set_body_json(nine_categories()))
        .await;
    for (category, count) in [("payments", 3), ("merchandising", 5)] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("category", category))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": products_json(count, category) })))
            .mount(&mock.server)
            .await;
    }

    let base = Url::parse("https://shop.test/wp-admin/admin.php").unwrap();
    let start = Query::for_path("/extensions").with_params(&[("category", "payments")]);
    let location = Arc::new(MemoryHistory::new(start.to_url(&base)));
    let mut page = MarketplacePage::new(mock.client(), location.clone());

    page.refresh().await;
    page.choose_category("merchandising").await;
    assert_eq!(page.products().products().len(), 5);
    assert_eq!(page.categories().mobile_dropdown_label(), "Merchandising");

    assert!(location.back());
    assert!(page.follow_next_change().await);

    assert_eq!(location.query().get("category"), Some("payments"));
    assert_eq!(page.categories().mobile_dropdown_label(), "Payments");
    assert_eq!(page.products().products().len(), 3);
}
