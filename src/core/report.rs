use crate::core::kpi::KpiSummary;
use crate::domain::model::{Customer, Invoice, Product};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, TrinityError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_BUNDLE_NAME: &str = "dashboard.zip";

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| TrinityError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TrinityError::validation(e.to_string()))
}

fn amount(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn quantity(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn products_csv(products: &[Product]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "name", "brand", "category", "price", "quantity", "inventory_value"])?;
    for product in products {
        writer.write_record([
            product.id.to_string(),
            product.name.clone(),
            product.brand.clone(),
            product.category.clone(),
            amount(product.price),
            quantity(product.quantity),
            format!("{:.2}", product.inventory_value()),
        ])?;
    }
    finish(writer)
}

pub fn customers_csv(customers: &[Customer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id", "first_name", "last_name", "phone", "address", "city", "zip_code", "country",
    ])?;
    for customer in customers {
        writer.write_record([
            customer.id.to_string(),
            customer.first_name.clone(),
            customer.last_name.clone(),
            customer.phone.clone(),
            customer.address.clone(),
            customer.city.clone(),
            customer.zip_code.clone(),
            customer.country.clone(),
        ])?;
    }
    finish(writer)
}

pub fn invoices_csv(invoices: &[Invoice]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "customer", "total", "created_at"])?;
    for invoice in invoices {
        writer.write_record([
            invoice.id.to_string(),
            invoice.customer.map(|c| c.to_string()).unwrap_or_default(),
            amount(invoice.total),
            invoice
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

/// Packs the summary as `kpis.json` plus the two top-N views as CSV.
pub fn build_report_bundle(summary: &KpiSummary) -> Result<Vec<u8>> {
    let top_products: Vec<Product> = summary
        .top_products
        .iter()
        .map(|ranked| ranked.product.clone())
        .collect();

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("kpis.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

    zip.start_file::<_, ()>("recent_invoices.csv", FileOptions::default())?;
    zip.write_all(invoices_csv(&summary.recent_invoices)?.as_bytes())?;

    zip.start_file::<_, ()>("top_products.csv", FileOptions::default())?;
    zip.write_all(products_csv(&top_products)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Writes the bundle through `storage` and returns its file name.
pub async fn export_report<S: Storage>(storage: &S, summary: &KpiSummary) -> Result<String> {
    let data = build_report_bundle(summary)?;
    tracing::debug!("Writing report bundle ({} bytes)", data.len());
    storage.write_file(REPORT_BUNDLE_NAME, &data).await?;
    Ok(REPORT_BUNDLE_NAME.to_string())
}
