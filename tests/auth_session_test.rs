use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use httpmock::prelude::*;
use tempfile::TempDir;
use trinity::domain::ports::BackOffice;
use trinity::{ApiClient, SessionStore, TrinityConfig, TrinityError};

fn jwt(username: &str) -> String {
    let claims = serde_json::json!({"token_type": "access", "user_id": 1, "username": username});
    format!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.sig",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

fn config_for(server: &MockServer) -> TrinityConfig {
    let mut config = TrinityConfig::default();
    config.api.base_url = server.url("/api/");
    config
}

/// 登入 → 儲存 session → 帶 token 呼叫 API
#[tokio::test]
async fn test_login_persist_and_call_api() -> Result<()> {
    let server = MockServer::start();
    let access = jwt("manager");

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/token/")
            .json_body(serde_json::json!({"username": "manager", "password": "s3cret"}));
        then.status(200)
            .json_body(serde_json::json!({"access": access.clone(), "refresh": "refresh-1"}));
    });
    let expected_auth = format!("Bearer {}", access);
    let products_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/products/")
            .header("Authorization", expected_auth.as_str());
        then.status(200).json_body(serde_json::json!([]));
    });

    let config = config_for(&server);
    let session = ApiClient::new(&config, None)?.login("manager", "s3cret").await?;
    token_mock.assert();
    assert_eq!(session.username, "manager");
    assert_eq!(session.refresh.as_deref(), Some("refresh-1"));

    let temp_dir = TempDir::new()?;
    let store = SessionStore::new(temp_dir.path().join("session.json"));
    store.save(&session)?;

    let restored = store.load()?.expect("session should be stored");
    let api = ApiClient::new(&config, Some(restored))?;
    assert!(api.list_products().await?.is_empty());
    products_mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/token/");
        then.status(401)
            .json_body(serde_json::json!({"detail": "No active account found with the given credentials"}));
    });

    let config = config_for(&server);
    let err = ApiClient::new(&config, None)?
        .login("manager", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, TrinityError::Unauthorized));
    Ok(())
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token() -> Result<()> {
    let server = MockServer::start();
    let renewed = jwt("manager");

    let refresh_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/token/refresh/")
            .json_body(serde_json::json!({"refresh": "refresh-1"}));
        then.status(200).json_body(serde_json::json!({"access": renewed.clone()}));
    });

    let config = config_for(&server);
    let old = trinity::Session::new("stale".to_string(), Some("refresh-1".to_string()));
    let fresh = ApiClient::new(&config, None)?.refresh(&old).await?;

    refresh_mock.assert();
    assert_eq!(fresh.access, renewed);
    assert_eq!(fresh.refresh.as_deref(), Some("refresh-1"));
    assert_eq!(fresh.username, "manager");
    Ok(())
}

#[tokio::test]
async fn test_request_without_session_is_unauthorized() -> Result<()> {
    let server = MockServer::start();
    let invoices_mock = server.mock(|when, then| {
        when.method(GET).path("/api/invoices/");
        then.status(401).json_body(serde_json::json!({"detail": "Authentication credentials were not provided."}));
    });

    let config = config_for(&server);
    let err = ApiClient::new(&config, None)?.list_invoices().await.unwrap_err();

    assert!(matches!(err, TrinityError::Unauthorized));
    invoices_mock.assert();
    Ok(())
}
