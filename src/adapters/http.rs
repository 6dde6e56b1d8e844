use crate::domain::model::{
    Customer, CustomerDraft, Invoice, InvoiceDraft, Product, ProductDraft,
};
use crate::domain::ports::{BackOffice, ConfigProvider};
use crate::domain::session::Session;
use crate::utils::error::{Result, TrinityError};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Customers,
    Invoices,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Customers => "customers",
            Resource::Invoices => "invoices",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Products => "Product",
            Resource::Customers => "Customer",
            Resource::Invoices => "Invoice",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// REST client for the back-office API.
///
/// The session is explicit: a client built without one sends no
/// `Authorization` header, and protected endpoints answer with
/// [`TrinityError::Unauthorized`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C, session: Option<Session>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");

        match &self.session {
            Some(session) => builder.header("Authorization", session.bearer()),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(TrinityError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TrinityError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.url("token/"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let tokens: TokenPair = Self::check(response).await?.json().await?;
        let session = Session::new(tokens.access, tokens.refresh);
        tracing::info!("🔑 Logged in as {}", session.username);
        Ok(session)
    }

    pub async fn refresh(&self, session: &Session) -> Result<Session> {
        let refresh = session
            .refresh
            .as_deref()
            .ok_or(TrinityError::Unauthorized)?;

        let response = self
            .client
            .post(self.url("token/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        let tokens: TokenPair = Self::check(response).await?.json().await?;
        let mut renewed = session.with_access(tokens.access);
        if tokens.refresh.is_some() {
            renewed.refresh = tokens.refresh;
        }
        Ok(renewed)
    }

    /// GETs a collection. A body that is not an array counts as empty, and
    /// elements that are not objects are dropped.
    pub async fn fetch_list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, &format!("{}/", resource.path()))
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;

        let Value::Array(items) = body else {
            tracing::warn!(
                "⚠️ {} endpoint did not return a list, treating it as empty",
                resource.path()
            );
            return Ok(Vec::new());
        };

        let total = items.len();
        let records: Vec<T> = items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping unreadable {} record: {}", resource.label(), e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            tracing::warn!(
                "⚠️ {} of {} {} records were skipped",
                total - records.len(),
                total,
                resource.path()
            );
        }
        tracing::debug!("Fetched {} {}", records.len(), resource.path());
        Ok(records)
    }

    pub async fn fetch_one<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T> {
        let response = self
            .request(Method::GET, &format!("{}/{}/", resource.path(), id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrinityError::NotFound {
                entity: resource.label().to_string(),
                id,
            });
        }
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_draft<B, T>(&self, method: Method, path: &str, draft: &B) -> Result<T>
    where
        B: Serialize + Validate + Sync,
        T: DeserializeOwned,
    {
        draft.validate()?;
        let response = self.request(method, path).json(draft).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create<B, T>(&self, resource: Resource, draft: &B) -> Result<T>
    where
        B: Serialize + Validate + Sync,
        T: DeserializeOwned,
    {
        let created = self
            .send_draft(Method::POST, &format!("{}/", resource.path()), draft)
            .await?;
        tracing::info!("✅ {} created", resource.label());
        Ok(created)
    }

    pub async fn update<B, T>(&self, resource: Resource, id: i64, draft: &B) -> Result<T>
    where
        B: Serialize + Validate + Sync,
        T: DeserializeOwned,
    {
        let path = format!("{}/{}/", resource.path(), id);
        let response = self.send_draft(Method::PUT, &path, draft).await;
        match response {
            Err(TrinityError::HttpStatus { status: 404, .. }) => Err(TrinityError::NotFound {
                entity: resource.label().to_string(),
                id,
            }),
            other => other,
        }
    }

    pub async fn delete(&self, resource: Resource, id: i64) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("{}/{}/", resource.path(), id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrinityError::NotFound {
                entity: resource.label().to_string(),
                id,
            });
        }
        Self::check(response).await?;
        tracing::info!("🗑️ {} #{} deleted", resource.label(), id);
        Ok(())
    }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.fetch_one(Resource::Products, id).await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.create(Resource::Products, draft).await
    }

    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        self.fetch_one(Resource::Customers, id).await
    }

    pub async fn create_customer(&self, draft: &CustomerDraft) -> Result<Customer> {
        self.create(Resource::Customers, draft).await
    }

    pub async fn update_customer(&self, id: i64, draft: &CustomerDraft) -> Result<Customer> {
        self.update(Resource::Customers, id, draft).await
    }

    pub async fn get_invoice(&self, id: i64) -> Result<Invoice> {
        self.fetch_one(Resource::Invoices, id).await
    }

    pub async fn create_invoice(&self, draft: &InvoiceDraft) -> Result<Invoice> {
        self.create(Resource::Invoices, draft).await
    }

    pub async fn update_invoice(&self, id: i64, draft: &InvoiceDraft) -> Result<Invoice> {
        self.update(Resource::Invoices, id, draft).await
    }

    /// Asks the server to enrich a product from OpenFoodFacts itself.
    /// Returns the stored `nutritional_info`.
    pub async fn enrich_product(&self, id: i64, query: &str) -> Result<Value> {
        let response = self
            .request(Method::POST, &format!("products/{}/enrich/", id))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let body: Value = Self::check(response).await?.json().await?;
        Ok(body.get("nutritional_info").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl BackOffice for ApiClient {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.fetch_list(Resource::Products).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.fetch_list(Resource::Customers).await
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        self.fetch_list(Resource::Invoices).await
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<Product> {
        self.update(Resource::Products, id, draft).await
    }

    async fn save_nutrition(&self, id: i64, nutritional_info: &Value) -> Result<Product> {
        let response = self
            .request(Method::PATCH, &format!("{}/{}/", Resource::Products.path(), id))
            .json(&serde_json::json!({ "nutritional_info": nutritional_info }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrinityError::NotFound {
                entity: Resource::Products.label().to_string(),
                id,
            });
        }
        Ok(Self::check(response).await?.json().await?)
    }
}
