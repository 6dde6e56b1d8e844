pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::*;

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::{TrinityConfig, DEFAULT_CONFIG_FILE};
    use crate::adapters::session_store::SessionStore;
    use crate::utils::error::Result;
    use clap::{Args, Parser, Subcommand, ValueEnum};
    use std::path::Path;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "trinity")]
    #[command(about = "Back-office client for the Trinity grocery store")]
    pub struct CliConfig {
        /// Path to a TOML configuration file (defaults to ./trinity.toml when present)
        #[arg(long, global = true)]
        pub config: Option<String>,

        /// Override the API base URL, e.g. http://localhost:8000/api
        #[arg(long, global = true)]
        pub api_url: Option<String>,

        /// Where the login session is stored
        #[arg(long, global = true)]
        pub session_file: Option<String>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON")]
        pub log_json: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum OutputFormat {
        Table,
        Json,
        Csv,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Obtain a session from /token/
        Login {
            #[arg(short, long)]
            username: String,
            #[arg(short, long)]
            password: String,
        },
        /// Forget the stored session
        Logout,
        /// Show who the stored session belongs to
        Whoami,
        /// Key performance indicators
        Dashboard {
            #[arg(long, value_enum, default_value = "table")]
            format: OutputFormat,
            /// Also write dashboard.zip into this directory
            #[arg(long)]
            export: Option<String>,
        },
        Products {
            #[command(subcommand)]
            action: ProductCommand,
        },
        Customers {
            #[command(subcommand)]
            action: CustomerCommand,
        },
        Invoices {
            #[command(subcommand)]
            action: InvoiceCommand,
        },
        /// Search OpenFoodFacts by name or barcode
        Search {
            query: String,
            #[arg(long)]
            page_size: Option<usize>,
        },
        /// Fill missing nutrition info from OpenFoodFacts
        Backfill {
            /// Process at most N products (0 = all)
            #[arg(long)]
            limit: Option<usize>,
            /// Seconds to wait between catalog requests
            #[arg(long)]
            delay: Option<f64>,
        },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum ProductCommand {
        List {
            #[arg(long, value_enum, default_value = "table")]
            format: OutputFormat,
        },
        Show {
            id: i64,
        },
        Create(ProductArgs),
        Update {
            id: i64,
            #[command(flatten)]
            fields: ProductArgs,
        },
        Delete {
            id: i64,
        },
        /// Nutrition estimate for a product
        Nutrition {
            id: i64,
            /// Quantity in grams (defaults to the product quantity, or 1)
            #[arg(long)]
            grams: Option<String>,
        },
        /// Let the server enrich a product from OpenFoodFacts
        Enrich {
            id: i64,
            query: String,
        },
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct ProductArgs {
        #[arg(long)]
        pub name: Option<String>,
        #[arg(long)]
        pub price: Option<f64>,
        #[arg(long)]
        pub brand: Option<String>,
        #[arg(long)]
        pub picture: Option<String>,
        #[arg(long)]
        pub category: Option<String>,
        #[arg(long)]
        pub quantity: Option<i64>,
        /// Prefill from the first OpenFoodFacts match for this name or barcode
        #[arg(long)]
        pub lookup: Option<String>,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum CustomerCommand {
        List {
            #[arg(long, value_enum, default_value = "table")]
            format: OutputFormat,
        },
        Show {
            id: i64,
        },
        Create(CustomerArgs),
        Update {
            id: i64,
            #[command(flatten)]
            fields: CustomerArgs,
        },
        Delete {
            id: i64,
        },
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct CustomerArgs {
        #[arg(long)]
        pub first_name: Option<String>,
        #[arg(long)]
        pub last_name: Option<String>,
        #[arg(long)]
        pub phone: Option<String>,
        #[arg(long)]
        pub address: Option<String>,
        #[arg(long)]
        pub city: Option<String>,
        #[arg(long)]
        pub zip_code: Option<String>,
        #[arg(long)]
        pub country: Option<String>,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum InvoiceCommand {
        List {
            #[arg(long, value_enum, default_value = "table")]
            format: OutputFormat,
        },
        Show {
            id: i64,
        },
        Create(InvoiceArgs),
        Update {
            id: i64,
            #[command(flatten)]
            fields: InvoiceArgs,
        },
        Delete {
            id: i64,
        },
        /// Write a printable invoice document
        Export {
            id: i64,
            /// Target directory (defaults to output.path)
            #[arg(long)]
            output: Option<String>,
        },
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct InvoiceArgs {
        #[arg(long)]
        pub customer: Option<i64>,
        #[arg(long)]
        pub total: Option<f64>,
    }

    impl CliConfig {
        /// Merges the optional TOML file with command-line overrides.
        pub fn resolve(&self) -> Result<TrinityConfig> {
            let mut config = match &self.config {
                Some(path) => TrinityConfig::from_file(path)?,
                None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                    TrinityConfig::from_file(DEFAULT_CONFIG_FILE)?
                }
                None => TrinityConfig::default(),
            };

            if let Some(api_url) = &self.api_url {
                config.api.base_url = api_url.clone();
            }
            if let Some(session_file) = &self.session_file {
                config.session.path = Some(session_file.clone());
            }
            Ok(config)
        }

        pub fn session_store(config: &TrinityConfig) -> SessionStore {
            match &config.session.path {
                Some(path) => SessionStore::new(path),
                None => SessionStore::new(SessionStore::default_path()),
            }
        }
    }

}
