pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::ApiClient, openfoodfacts::OpenFoodFactsClient, session_store::SessionStore};
pub use config::{cli::LocalStorage, toml_config::TrinityConfig};
pub use core::{
    dashboard::Dashboard,
    kpi::{aggregate, KpiSummary},
    nutrition::{derive_nutrition, NutritionSummary},
};
pub use domain::session::Session;
pub use utils::error::{Result, TrinityError};
