pub mod backfill;
pub mod dashboard;
pub mod invoice_document;
pub mod kpi;
pub mod nutrition;
pub mod report;

pub use crate::domain::model::{Customer, Invoice, Product};
pub use crate::domain::ports::{BackOffice, CatalogSearch, ConfigProvider, Storage};
pub use crate::utils::error::Result;
