use crate::domain::model::{Customer, Invoice};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::NaiveDate;

const PAGE_WIDTH: usize = 48;

pub fn resolve_customer<'a>(invoice: &Invoice, customers: &'a [Customer]) -> Option<&'a Customer> {
    let id = invoice.customer?;
    customers.iter().find(|c| c.id == id)
}

/// Printable invoice: header, bill-to block, total and footer.
pub fn render_invoice(invoice: &Invoice, customer: Option<&Customer>) -> String {
    let mut lines = vec![
        format!("{:^width$}", "TRINITY GROCERY", width = PAGE_WIDTH),
        format!("{:^width$}", "INVOICE", width = PAGE_WIDTH),
        String::new(),
        format!("Invoice #: {}", invoice.id),
        format!(
            "Date: {}",
            invoice
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        ),
        String::new(),
        "Bill To:".to_string(),
    ];

    match customer {
        Some(customer) => {
            lines.push(customer.full_name());
            lines.push(customer.phone.clone());
            if !customer.address.is_empty() {
                lines.push(customer.address.clone());
            }
            if !customer.city.is_empty() {
                lines.push(format!("{}, {}", customer.city, customer.zip_code));
            }
            if !customer.country.is_empty() {
                lines.push(customer.country.clone());
            }
        }
        None => lines.push("Unknown customer".to_string()),
    }

    lines.push(String::new());
    lines.push(format!("Total Amount: ${:.2}", invoice.amount()));
    lines.push(String::new());
    lines.push(format!("{:^width$}", "Thank you for your business!", width = PAGE_WIDTH));
    lines.push(format!(
        "{:^width$}",
        "Trinity Grocery Store Management System",
        width = PAGE_WIDTH
    ));

    let mut document = lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    document.push('\n');
    document
}

pub fn document_file_name(invoice: &Invoice, exported_on: NaiveDate) -> String {
    format!("Invoice_{}_{}.txt", invoice.id, exported_on.format("%Y-%m-%d"))
}

pub async fn export_invoice<S: Storage>(
    storage: &S,
    invoice: &Invoice,
    customer: Option<&Customer>,
    exported_on: NaiveDate,
) -> Result<String> {
    if customer.is_none() {
        tracing::warn!(
            "⚠️ Invoice #{} references an unknown customer {:?}",
            invoice.id,
            invoice.customer
        );
    }

    let file_name = document_file_name(invoice, exported_on);
    storage
        .write_file(&file_name, render_invoice(invoice, customer).as_bytes())
        .await?;
    tracing::info!("🧾 Invoice #{} exported as {}", invoice.id, file_name);
    Ok(file_name)
}
