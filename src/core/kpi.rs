use crate::domain::model::{Customer, Invoice, Product};
use serde::Serialize;

pub const RECENT_INVOICES_LIMIT: usize = 5;
pub const TOP_PRODUCTS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub inventory_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_products: usize,
    pub total_customers: usize,
    pub total_invoices: usize,
    pub average_invoice_amount: f64,
    pub inventory_value: f64,
    pub recent_invoices: Vec<Invoice>,
    pub top_products: Vec<RankedProduct>,
}

/// Computes the dashboard summary from a full snapshot.
///
/// Unparseable totals, prices and quantities count as zero. Invoices without
/// a usable `created_at` rank behind every dated invoice. Both top-N lists
/// keep input order among equal keys.
pub fn aggregate(products: &[Product], customers: &[Customer], invoices: &[Invoice]) -> KpiSummary {
    let total_revenue: f64 = invoices.iter().map(Invoice::amount).sum();
    let average_invoice_amount = if invoices.is_empty() {
        0.0
    } else {
        total_revenue / invoices.len() as f64
    };
    let inventory_value: f64 = products.iter().map(Product::inventory_value).sum();

    let mut recent_invoices = invoices.to_vec();
    // Option 排序時 None 最小，倒序後自然落在最後
    recent_invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_invoices.truncate(RECENT_INVOICES_LIMIT);

    let mut top_products: Vec<RankedProduct> = products
        .iter()
        .map(|product| RankedProduct {
            inventory_value: product.inventory_value(),
            product: product.clone(),
        })
        .collect();
    top_products.sort_by(|a, b| b.inventory_value.total_cmp(&a.inventory_value));
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    KpiSummary {
        total_revenue,
        total_products: products.len(),
        total_customers: customers.len(),
        total_invoices: invoices.len(),
        average_invoice_amount,
        inventory_value,
        recent_invoices,
        top_products,
    }
}
