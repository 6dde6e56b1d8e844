use anyhow::Result;
use httpmock::prelude::*;
use trinity::core::report;
use trinity::{ApiClient, Dashboard, LocalStorage, Session, TrinityConfig};
use tempfile::TempDir;

fn config_for(server: &MockServer) -> TrinityConfig {
    let mut config = TrinityConfig::default();
    config.api.base_url = server.url("/api");
    config.catalog.base_url = server.base_url();
    config
}

fn session() -> Option<Session> {
    Some(Session::new("test-token".to_string(), None))
}

/// 三個列表同時載入後計算 KPI
#[tokio::test]
async fn test_dashboard_end_to_end() -> Result<()> {
    let server = MockServer::start();

    let products_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/products/")
            .header("Authorization", "Bearer test-token");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "name": "Milk", "price": "1.50", "quantity": 10},
            {"id": 2, "name": "Cheese", "price": "7.00", "quantity": 3},
            {"id": 3, "name": "Salt", "price": "0.80", "quantity": null}
        ]));
    });
    let customers_mock = server.mock(|when, then| {
        when.method(GET).path("/api/customers/");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "first_name": "Ada", "last_name": "Lovelace"}
        ]));
    });
    let invoices_mock = server.mock(|when, then| {
        when.method(GET).path("/api/invoices/");
        then.status(200).json_body(serde_json::json!([
            {"id": 1, "customer": 1, "total": "10.50", "created_at": "2024-01-01"},
            {"id": 2, "customer": 1, "total": "5", "created_at": "2024-02-01"}
        ]));
    });

    let config = config_for(&server);
    let dashboard = Dashboard::new(ApiClient::new(&config, session())?);
    let summary = dashboard.load().await?;

    products_mock.assert();
    customers_mock.assert();
    invoices_mock.assert();

    assert_eq!(summary.total_revenue, 15.5);
    assert_eq!(summary.average_invoice_amount, 7.75);
    assert_eq!(summary.inventory_value, 36.0);
    assert_eq!(summary.total_products, 3);
    assert_eq!(summary.total_customers, 1);
    assert_eq!(summary.total_invoices, 2);

    let recent: Vec<i64> = summary.recent_invoices.iter().map(|i| i.id).collect();
    assert_eq!(recent, vec![2, 1]);
    let top: Vec<i64> = summary.top_products.iter().map(|p| p.product.id).collect();
    assert_eq!(top, vec![2, 1, 3]);
    assert_eq!(summary.top_products[2].inventory_value, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_empty_collections_give_zero_summary() -> Result<()> {
    let server = MockServer::start();
    for path in ["/api/products/", "/api/customers/", "/api/invoices/"] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(serde_json::json!([]));
        });
    }

    let config = config_for(&server);
    let summary = Dashboard::new(ApiClient::new(&config, session())?).load().await?;

    assert_eq!(summary.total_revenue, 0.0);
    assert_eq!(summary.average_invoice_amount, 0.0);
    assert_eq!(summary.inventory_value, 0.0);
    assert_eq!(summary.total_products, 0);
    assert!(summary.recent_invoices.is_empty());
    assert!(summary.top_products.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_one_failing_list_fails_the_dashboard() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/products/");
        then.status(200).json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/customers/");
        then.status(200).json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/invoices/");
        then.status(500).body("Internal Server Error");
    });

    let config = config_for(&server);
    let result = Dashboard::new(ApiClient::new(&config, session())?).load().await;

    match result {
        Err(trinity::TrinityError::HttpStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected HTTP 500, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_report_bundle_written_to_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let invoices: Vec<trinity::core::Invoice> = serde_json::from_value(serde_json::json!([
        {"id": 7, "customer": 1, "total": "12.00", "created_at": "2024-03-01T12:00:00Z"}
    ]))?;
    let summary = trinity::aggregate(&[], &[], &invoices);

    let storage = LocalStorage::new(output_path.clone());
    let name = report::export_report(&storage, &summary).await?;
    assert_eq!(name, "dashboard.zip");

    let zip_data = std::fs::read(temp_dir.path().join("dashboard.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;

    let mut csv_content = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("recent_invoices.csv")?, &mut csv_content)?;
    assert!(csv_content.starts_with("id,customer,total,created_at"));
    assert!(csv_content.contains("7,1,12.00,2024-03-01T12:00:00+00:00"));
    Ok(())
}
