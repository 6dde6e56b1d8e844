use crate::domain::catalog::{CatalogProduct, CatalogSearchResponse};
use crate::domain::ports::{CatalogSearch, ConfigProvider};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_CATALOG_URL: &str = "https://world.openfoodfacts.org";

/// Client for the OpenFoodFacts `search.pl` endpoint. Accepts a free-text
/// name or a barcode.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("trinity/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.catalog_base_url().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogSearch for OpenFoodFactsClient {
    async fn try_search(&self, query: &str, page_size: usize) -> Result<Vec<CatalogProduct>> {
        let page_size = page_size.to_string();
        let response = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: CatalogSearchResponse = response.json().await?;
        let products = body
            .products
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    struct CatalogConfig(String);

    impl ConfigProvider for CatalogConfig {
        fn api_base_url(&self) -> &str {
            "http://127.0.0.1:9/api"
        }

        fn catalog_base_url(&self) -> &str {
            &self.0
        }

        fn catalog_page_size(&self) -> usize {
            10
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        fn output_path(&self) -> &str {
            "test_output"
        }
    }

    #[tokio::test]
    async fn test_search_sends_expected_parameters() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/cgi/search.pl")
                .query_param("search_terms", "nutella")
                .query_param("search_simple", "1")
                .query_param("json", "1")
                .query_param("page_size", "10");
            then.status(200).json_body(serde_json::json!({
                "count": 1,
                "products": [{
                    "product_name": "Nutella",
                    "brands": "Ferrero",
                    "serving_size": "15 g",
                    "nutriments": {"fat_100g": 30.9}
                }]
            }));
        });

        let catalog = OpenFoodFactsClient::new(&CatalogConfig(server.base_url())).unwrap();
        let results = catalog.search("nutella", 10).await;

        search_mock.assert();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name(), "Nutella");
    }

    #[tokio::test]
    async fn test_server_error_yields_no_candidates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cgi/search.pl");
            then.status(503).body("busy");
        });

        let catalog = OpenFoodFactsClient::new(&CatalogConfig(server.base_url())).unwrap();
        assert!(catalog.search("3017620422003", 1).await.is_empty());
        assert!(catalog.try_search("3017620422003", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_products_field_yields_no_candidates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cgi/search.pl");
            then.status(200).json_body(serde_json::json!({"count": 0}));
        });

        let catalog = OpenFoodFactsClient::new(&CatalogConfig(server.base_url())).unwrap();
        assert!(catalog.search("nothing", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET).path("/cgi/search.pl");
            then.status(200).json_body(serde_json::json!({"products": []}));
        });

        let catalog = OpenFoodFactsClient::new(&CatalogConfig(server.base_url())).unwrap();
        assert!(catalog.search("   ", 10).await.is_empty());
        search_mock.assert_hits(0);
    }
}
