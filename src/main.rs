use clap::Parser;
use trinity::adapters::http::Resource;
use trinity::config::toml_config::delay_from_secs;
use trinity::config::{
    Command, CustomerArgs, CustomerCommand, InvoiceArgs, InvoiceCommand, OutputFormat, ProductArgs,
    ProductCommand,
};
use trinity::core::backfill::{BackfillOptions, NutritionBackfill};
use trinity::core::invoice_document;
use trinity::core::report;
use trinity::domain::catalog::CatalogProduct;
use trinity::domain::coerce;
use trinity::domain::model::{Customer, CustomerDraft, Invoice, InvoiceDraft, Product, ProductDraft};
use trinity::domain::nutrition::NutritionPayload;
use trinity::domain::ports::{BackOffice, CatalogSearch, ConfigProvider};
use trinity::utils::error::ErrorSeverity;
use trinity::utils::{logger, validation::Validate};
use trinity::{
    derive_nutrition, ApiClient, CliConfig, Dashboard, KpiSummary, LocalStorage,
    NutritionSummary, OpenFoodFactsClient, Result, SessionStore, TrinityConfig, TrinityError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    let store = CliConfig::session_store(&config);

    if let Err(e) = run(&cli.command, &config, &store).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        // 與網頁版一致：401 時清除本地 token
        if matches!(e, TrinityError::Unauthorized) {
            if let Err(clear_err) = store.clear() {
                tracing::warn!("⚠️ Could not remove session file: {}", clear_err);
            }
        }

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: &Command, config: &TrinityConfig, store: &SessionStore) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let session = ApiClient::new(config, None)?.login(username, password).await?;
            store.save(&session)?;
            println!("✅ Logged in as {}", session.username);
        }
        Command::Logout => {
            store.clear()?;
            println!("👋 Logged out");
        }
        Command::Whoami => match store.load()? {
            Some(session) => println!("{}", session.username),
            None => println!("Not logged in"),
        },
        Command::Dashboard { format, export } => {
            let summary = Dashboard::new(authed_client(config, store)?).load().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Csv => print!("{}", report::invoices_csv(&summary.recent_invoices)?),
                OutputFormat::Table => print_kpis(&summary),
            }
            if let Some(dir) = export {
                let storage = LocalStorage::new(dir.clone());
                let name = report::export_report(&storage, &summary).await?;
                println!("📁 Report saved to: {}", storage.full_path(&name).display());
            }
        }
        Command::Products { action } => run_products(action, config, store).await?,
        Command::Customers { action } => run_customers(action, config, store).await?,
        Command::Invoices { action } => run_invoices(action, config, store).await?,
        Command::Search { query, page_size } => {
            let catalog = OpenFoodFactsClient::new(config)?;
            let results = catalog
                .search(query, page_size.unwrap_or_else(|| config.catalog_page_size()))
                .await;
            if results.is_empty() {
                println!("No results from OpenFoodFacts");
            }
            for candidate in &results {
                print_candidate(candidate);
            }
        }
        Command::Backfill { limit, delay } => {
            let options = BackfillOptions {
                limit: limit.or(Some(config.backfill.limit)).filter(|l| *l > 0),
                delay: match delay {
                    Some(secs) => delay_from_secs("--delay", *secs)?,
                    None => config.backfill_delay()?,
                },
            };
            let backfill = NutritionBackfill::new(
                authed_client(config, store)?,
                OpenFoodFactsClient::new(config)?,
                options,
            );
            let report = backfill.run().await?;
            println!(
                "🥫 Backfill complete: {} examined, {} updated, {} skipped, {} not found, {} failed",
                report.examined, report.updated, report.skipped, report.not_found, report.failed
            );
        }
    }
    Ok(())
}

fn authed_client(config: &TrinityConfig, store: &SessionStore) -> Result<ApiClient> {
    let session = store.load()?.ok_or(TrinityError::Unauthorized)?;
    ApiClient::new(config, Some(session))
}

async fn run_products(action: &ProductCommand, config: &TrinityConfig, store: &SessionStore) -> Result<()> {
    let api = authed_client(config, store)?;
    match action {
        ProductCommand::List { format } => {
            let products = api.list_products().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&products)?),
                OutputFormat::Csv => print!("{}", report::products_csv(&products)?),
                OutputFormat::Table => print_products(&products),
            }
        }
        ProductCommand::Show { id } => {
            println!("{}", serde_json::to_string_pretty(&api.get_product(*id).await?)?);
        }
        ProductCommand::Create(args) => {
            let mut draft = ProductDraft::default();
            apply_product_args(config, &mut draft, args).await?;
            let product = api.create_product(&draft).await?;
            println!("✅ Created product #{} {}", product.id, product.name);
        }
        ProductCommand::Update { id, fields } => {
            let mut draft = api.get_product(*id).await?.to_draft();
            apply_product_args(config, &mut draft, fields).await?;
            let product = api.update_product(*id, &draft).await?;
            println!("✅ Updated product #{} {}", product.id, product.name);
        }
        ProductCommand::Delete { id } => {
            api.delete(Resource::Products, *id).await?;
            println!("🗑️ Deleted product #{}", id);
        }
        ProductCommand::Nutrition { id, grams } => {
            let product = api.get_product(*id).await?;
            let quantity = match grams {
                Some(raw) => coerce::number_str(raw),
                None => Some(product.quantity.filter(|q| *q > 0.0).unwrap_or(1.0)),
            };
            let payload = product.nutrition();
            let summary = derive_nutrition(&payload, quantity);
            println!(
                "{}: nutrition for {}",
                product.name,
                quantity.map(|q| format!("{} g", q)).unwrap_or_else(|| "one serving".to_string())
            );
            print_payload_source(&payload);
            print_nutrition(&summary);
        }
        ProductCommand::Enrich { id, query } => {
            let info = api.enrich_product(*id, query).await?;
            println!("✅ Enriched product #{}", id);
            let payload = NutritionPayload::from_value(&info);
            print_payload_source(&payload);
            print_nutrition(&derive_nutrition(&payload, Some(100.0)));
        }
    }
    Ok(())
}

/// Catalog prefill first, then explicit flags win.
async fn apply_product_args(config: &TrinityConfig, draft: &mut ProductDraft, args: &ProductArgs) -> Result<()> {
    if let Some(query) = &args.lookup {
        let catalog = OpenFoodFactsClient::new(config)?;
        match catalog.search(query, config.catalog_page_size()).await.first() {
            Some(candidate) => {
                tracing::info!("🔎 Prefilling from OpenFoodFacts: {}", candidate.display_name());
                candidate.apply_to(draft);
            }
            None => tracing::warn!("⚠️ No results from OpenFoodFacts for '{}'", query),
        }
    }

    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    if let Some(price) = args.price {
        draft.price = price;
    }
    if let Some(brand) = &args.brand {
        draft.brand = brand.clone();
    }
    if let Some(picture) = &args.picture {
        draft.picture = picture.clone();
    }
    if let Some(category) = &args.category {
        draft.category = category.clone();
    }
    if let Some(quantity) = args.quantity {
        draft.quantity = quantity;
    }
    Ok(())
}

async fn run_customers(action: &CustomerCommand, config: &TrinityConfig, store: &SessionStore) -> Result<()> {
    let api = authed_client(config, store)?;
    match action {
        CustomerCommand::List { format } => {
            let customers = api.list_customers().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&customers)?),
                OutputFormat::Csv => print!("{}", report::customers_csv(&customers)?),
                OutputFormat::Table => print_customers(&customers),
            }
        }
        CustomerCommand::Show { id } => {
            println!("{}", serde_json::to_string_pretty(&api.get_customer(*id).await?)?);
        }
        CustomerCommand::Create(args) => {
            let mut draft = CustomerDraft::default();
            apply_customer_args(&mut draft, args);
            let customer = api.create_customer(&draft).await?;
            println!("✅ Created customer #{} {}", customer.id, customer.full_name());
        }
        CustomerCommand::Update { id, fields } => {
            let mut draft = api.get_customer(*id).await?.to_draft();
            apply_customer_args(&mut draft, fields);
            let customer = api.update_customer(*id, &draft).await?;
            println!("✅ Updated customer #{} {}", customer.id, customer.full_name());
        }
        CustomerCommand::Delete { id } => {
            api.delete(Resource::Customers, *id).await?;
            println!("🗑️ Deleted customer #{}", id);
        }
    }
    Ok(())
}

fn apply_customer_args(draft: &mut CustomerDraft, args: &CustomerArgs) {
    let fields = [
        (&mut draft.first_name, &args.first_name),
        (&mut draft.last_name, &args.last_name),
        (&mut draft.phone, &args.phone),
        (&mut draft.address, &args.address),
        (&mut draft.city, &args.city),
        (&mut draft.zip_code, &args.zip_code),
        (&mut draft.country, &args.country),
    ];
    for (target, value) in fields {
        if let Some(value) = value {
            *target = value.clone();
        }
    }
}

async fn run_invoices(action: &InvoiceCommand, config: &TrinityConfig, store: &SessionStore) -> Result<()> {
    let api = authed_client(config, store)?;
    match action {
        InvoiceCommand::List { format } => {
            let invoices = api.list_invoices().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&invoices)?),
                OutputFormat::Csv => print!("{}", report::invoices_csv(&invoices)?),
                OutputFormat::Table => {
                    let customers = api.list_customers().await?;
                    print_invoices(&invoices, &customers);
                }
            }
        }
        InvoiceCommand::Show { id } => {
            println!("{}", serde_json::to_string_pretty(&api.get_invoice(*id).await?)?);
        }
        InvoiceCommand::Create(args) => {
            let mut draft = InvoiceDraft::default();
            apply_invoice_args(&mut draft, args);
            let invoice = api.create_invoice(&draft).await?;
            println!("✅ Created invoice #{} ({})", invoice.id, currency(invoice.amount()));
        }
        InvoiceCommand::Update { id, fields } => {
            let mut draft = api.get_invoice(*id).await?.to_draft();
            apply_invoice_args(&mut draft, fields);
            let invoice = api.update_invoice(*id, &draft).await?;
            println!("✅ Updated invoice #{} ({})", invoice.id, currency(invoice.amount()));
        }
        InvoiceCommand::Delete { id } => {
            api.delete(Resource::Invoices, *id).await?;
            println!("🗑️ Deleted invoice #{}", id);
        }
        InvoiceCommand::Export { id, output } => {
            let invoice = api.get_invoice(*id).await?;
            let customer = match invoice.customer {
                Some(customer_id) => match api.get_customer(customer_id).await {
                    Ok(customer) => Some(customer),
                    Err(TrinityError::NotFound { .. }) => None,
                    Err(e) => return Err(e),
                },
                None => None,
            };

            let storage = LocalStorage::new(output.clone().unwrap_or_else(|| config.output_path().to_string()));
            let exported_on = chrono::Local::now().date_naive();
            let name =
                invoice_document::export_invoice(&storage, &invoice, customer.as_ref(), exported_on).await?;
            println!("📁 Invoice saved to: {}", storage.full_path(&name).display());
        }
    }
    Ok(())
}

fn apply_invoice_args(draft: &mut InvoiceDraft, args: &InvoiceArgs) {
    if let Some(customer) = args.customer {
        draft.customer = customer;
    }
    if let Some(total) = args.total {
        draft.total = total;
    }
}

fn currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn format_date(invoice: &Invoice) -> String {
    invoice
        .created_at
        .map(|t| t.with_timezone(&chrono::Local).format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn format_quantity(quantity: Option<f64>) -> String {
    quantity.map(|q| q.to_string()).unwrap_or_else(|| "—".to_string())
}

fn print_kpis(summary: &KpiSummary) {
    println!("Dashboard - Key Performance Indicators");
    println!();
    println!("💰 Total Revenue     {}", currency(summary.total_revenue));
    println!("📦 Total Products    {}", summary.total_products);
    println!("👥 Total Customers   {}", summary.total_customers);
    println!("🧾 Total Invoices    {}", summary.total_invoices);
    println!("📊 Average Invoice   {}", currency(summary.average_invoice_amount));
    println!("🏪 Inventory Value   {}", currency(summary.inventory_value));
    println!();

    println!("Recent Invoices");
    if summary.recent_invoices.is_empty() {
        println!("  No invoices yet");
    } else {
        println!("  {:<10} {:>12}  {}", "Invoice #", "Total", "Date");
        for invoice in &summary.recent_invoices {
            println!(
                "  {:<10} {:>12}  {}",
                format!("#{}", invoice.id),
                currency(invoice.amount()),
                format_date(invoice)
            );
        }
    }
    println!();

    println!("Top Products by Inventory Value");
    if summary.top_products.is_empty() {
        println!("  No products yet");
    } else {
        println!("  {:<30} {:>10} {:>12}", "Product", "Quantity", "Value");
        for ranked in &summary.top_products {
            println!(
                "  {:<30} {:>10} {:>12}",
                ranked.product.name,
                format_quantity(ranked.product.quantity),
                currency(ranked.inventory_value)
            );
        }
    }
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products yet");
        return;
    }
    println!("{:<6} {:<30} {:<20} {:>10} {:>10}", "ID", "Name", "Brand", "Price", "Quantity");
    for product in products {
        println!(
            "{:<6} {:<30} {:<20} {:>10} {:>10}",
            product.id,
            product.name,
            product.brand,
            product.price.map(currency).unwrap_or_else(|| "—".to_string()),
            format_quantity(product.quantity)
        );
    }
}

fn print_customers(customers: &[Customer]) {
    if customers.is_empty() {
        println!("No customers yet");
        return;
    }
    println!("{:<6} {:<30} {:<16} {}", "ID", "Name", "Phone", "City");
    for customer in customers {
        println!(
            "{:<6} {:<30} {:<16} {}",
            customer.id,
            customer.full_name(),
            customer.phone,
            customer.city
        );
    }
}

fn print_invoices(invoices: &[Invoice], customers: &[Customer]) {
    if invoices.is_empty() {
        println!("No invoices yet");
        return;
    }
    println!("{:<10} {:<30} {:>12}  {}", "Invoice #", "Customer", "Total", "Date");
    for invoice in invoices {
        let customer = invoice_document::resolve_customer(invoice, customers)
            .map(Customer::full_name)
            .unwrap_or_else(|| "Unknown".to_string());
        println!(
            "{:<10} {:<30} {:>12}  {}",
            format!("#{}", invoice.id),
            customer,
            currency(invoice.amount()),
            format_date(invoice)
        );
    }
}

fn print_payload_source(payload: &NutritionPayload) {
    if let Some(name) = &payload.product_name {
        println!("  source: {}", name);
    }
    if let Some(serving) = &payload.serving_size {
        println!("  serving: {}", serving);
    }
}

fn print_nutrition(summary: &NutritionSummary) {
    if summary.is_empty() {
        println!("No nutrition data available for this product.");
        return;
    }
    for (nutrient, value) in summary.entries() {
        match value {
            Some(v) => println!("  {:<15} {:>8.1} {}", nutrient.label(), v, nutrient.unit()),
            None => println!("  {:<15} {:>8}", nutrient.label(), "—"),
        }
    }
}

fn print_candidate(candidate: &CatalogProduct) {
    println!(
        "• {} [{}] {}",
        candidate.display_name(),
        candidate.brands.as_deref().unwrap_or("—"),
        candidate.code.as_deref().unwrap_or("")
    );
    if let Some(serving) = &candidate.serving_size {
        println!("  serving: {}", serving);
    }
    let per_100g = derive_nutrition(&NutritionPayload::from_value(&candidate.nutrition_payload()), Some(100.0));
    if !per_100g.is_empty() {
        println!("  per 100 g:");
        print_nutrition(&per_100g);
    }
}
