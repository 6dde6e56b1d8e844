use crate::domain::model::Product;
use crate::domain::ports::{BackOffice, CatalogSearch};
use crate::utils::error::Result;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Process at most this many products lacking nutrition info.
    pub limit: Option<usize>,
    /// Pause between catalog lookups, to stay under the catalog's rate limit.
    pub delay: Duration,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            limit: None,
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub examined: usize,
    pub updated: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Fills `nutritional_info` for products that have none, using the first
/// catalog match for the product name (or brand).
pub struct NutritionBackfill<B: BackOffice, C: CatalogSearch> {
    api: B,
    catalog: C,
    options: BackfillOptions,
}

fn search_query(product: &Product) -> Option<&str> {
    [product.name.trim(), product.brand.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
}

impl<B: BackOffice, C: CatalogSearch> NutritionBackfill<B, C> {
    pub fn new(api: B, catalog: C, options: BackfillOptions) -> Self {
        Self {
            api,
            catalog,
            options,
        }
    }

    pub async fn run(&self) -> Result<BackfillReport> {
        let products = self.api.list_products().await?;
        let mut targets: Vec<Product> = products.into_iter().filter(Product::lacks_nutrition).collect();
        if let Some(limit) = self.options.limit.filter(|l| *l > 0) {
            targets.truncate(limit);
        }

        let total = targets.len();
        tracing::info!("🥫 Found {} products to backfill", total);

        let mut report = BackfillReport::default();
        for (index, product) in targets.iter().enumerate() {
            let position = index + 1;
            report.examined += 1;

            let Some(query) = search_query(product) else {
                tracing::info!("[{}/{}] Skipping product id={} (no name)", position, total, product.id);
                report.skipped += 1;
                continue;
            };

            match self.catalog.try_search(query, 1).await.map(|r| r.into_iter().next()) {
                Err(e) => {
                    tracing::warn!(
                        "[{}/{}] ⚠️ Catalog lookup for \"{}\" failed: {}",
                        position,
                        total,
                        query,
                        e
                    );
                    report.failed += 1;
                }
                Ok(None) => {
                    tracing::info!("[{}/{}] No catalog result for \"{}\"", position, total, query);
                    report.not_found += 1;
                }
                Ok(Some(candidate)) => {
                    match self.api.save_nutrition(product.id, &candidate.backfill_payload()).await {
                        Ok(_) => {
                            tracing::info!(
                                "[{}/{}] ✅ Backfilled product id={} from \"{}\"",
                                position,
                                total,
                                product.id,
                                query
                            );
                            report.updated += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "[{}/{}] ⚠️ Could not update product id={}: {}",
                                position,
                                total,
                                product.id,
                                e
                            );
                            report.failed += 1;
                        }
                    }
                }
            }

            if position < total && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
        }

        tracing::info!("🥫 Backfill complete: {:?}", report);
        Ok(report)
    }
}
