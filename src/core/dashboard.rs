use crate::core::kpi::{aggregate, KpiSummary};
use crate::domain::model::{Customer, Invoice, Product};
use crate::domain::ports::BackOffice;
use crate::utils::error::Result;

/// Everything the dashboard needs, fetched in one go.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
}

impl Snapshot {
    pub fn summarize(&self) -> KpiSummary {
        aggregate(&self.products, &self.customers, &self.invoices)
    }
}

pub struct Dashboard<B: BackOffice> {
    api: B,
}

impl<B: BackOffice> Dashboard<B> {
    pub fn new(api: B) -> Self {
        Self { api }
    }

    /// Issues the three list requests concurrently. The first failure
    /// aborts the others; no partial snapshot is ever returned.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        tracing::debug!("Fetching products, customers and invoices");
        let (products, customers, invoices) = tokio::try_join!(
            self.api.list_products(),
            self.api.list_customers(),
            self.api.list_invoices()
        )?;

        tracing::info!(
            "📥 Loaded {} products, {} customers, {} invoices",
            products.len(),
            customers.len(),
            invoices.len()
        );
        Ok(Snapshot {
            products,
            customers,
            invoices,
        })
    }

    pub async fn load(&self) -> Result<KpiSummary> {
        Ok(self.snapshot().await?.summarize())
    }
}
