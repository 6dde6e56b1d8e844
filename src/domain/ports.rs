use crate::domain::catalog::CatalogProduct;
use crate::domain::model::{Customer, Invoice, Product, ProductDraft};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn catalog_base_url(&self) -> &str;
    fn catalog_page_size(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
}

/// The part of the back-office API the dashboard and batch jobs rely on.
#[async_trait]
pub trait BackOffice: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn list_customers(&self) -> Result<Vec<Customer>>;
    async fn list_invoices(&self) -> Result<Vec<Invoice>>;
    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product>;
    /// Writes only `nutritional_info`, leaving the other product fields untouched.
    async fn save_nutrition(&self, id: i64, nutritional_info: &Value) -> Result<Product>;
}

/// Third-party product lookup.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn try_search(&self, query: &str, page_size: usize) -> Result<Vec<CatalogProduct>>;

    /// Lenient lookup for interactive use: a blank query or an unreachable
    /// catalog yields no candidates.
    async fn search(&self, query: &str, page_size: usize) -> Vec<CatalogProduct> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        tracing::debug!("🔎 Searching catalog for '{}'", query);
        match self.try_search(query, page_size).await {
            Ok(products) => {
                tracing::debug!("🔎 {} candidates for '{}'", products.len(), query);
                products
            }
            Err(e) => {
                tracing::warn!("⚠️ Catalog search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
