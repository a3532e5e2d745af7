use async_trait::async_trait;
use gloo::net::http::{Request, Response};
use shared::{ApiErrorBody, NewTransaction, Transaction, TransactionId, TransactionKind};

use crate::config::AppConfig;
use crate::error::ApiError;

/// Backend endpoints, relative to the configured base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Add(TransactionKind),
    List(TransactionKind),
    Delete(TransactionKind, &'a TransactionId),
}

impl Endpoint<'_> {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Add(kind) => format!("add-{}", kind),
            Endpoint::List(kind) => format!("get-{}s", kind),
            Endpoint::Delete(kind, id) => format!("delete-{}/{}", kind, id),
        }
    }
}

/// Remote operations the ledger store depends on.
///
/// Browser futures are not `Send`, so neither is this trait.
#[async_trait(?Send)]
pub trait LedgerApi {
    /// Submit a new record to the given collection
    async fn add(&self, kind: TransactionKind, record: &NewTransaction) -> Result<(), ApiError>;

    /// Fetch the full current collection
    async fn list(&self, kind: TransactionKind) -> Result<Vec<Transaction>, ApiError>;

    /// Delete a record by its backend id
    async fn delete(&self, kind: TransactionKind, id: &TransactionId) -> Result<(), ApiError>;
}

/// API client for communicating with the ledger backend
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.backend_url().to_string(),
        }
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(&AppConfig::new(base_url))
    }

    pub fn url(&self, endpoint: Endpoint<'_>) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

#[async_trait(?Send)]
impl LedgerApi for ApiClient {
    async fn add(&self, kind: TransactionKind, record: &NewTransaction) -> Result<(), ApiError> {
        let url = self.url(Endpoint::Add(kind));

        let response = Request::post(&url)
            .json(record)
            .map_err(|e| ApiError::Serialize(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        ensure_success(response).await.map(|_| ())
    }

    async fn list(&self, kind: TransactionKind) -> Result<Vec<Transaction>, ApiError> {
        let url = self.url(Endpoint::List(kind));

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        ensure_success(response)
            .await?
            .json::<Vec<Transaction>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn delete(&self, kind: TransactionKind, id: &TransactionId) -> Result<(), ApiError> {
        let url = self.url(Endpoint::Delete(kind, id));

        let response = Request::delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        ensure_success(response).await.map(|_| ())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status,
        message: error_message_from_body(&body),
    })
}

/// Pull the `message` field out of an error response body. Empty messages count as absent.
pub fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
}
