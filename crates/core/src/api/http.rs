use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::errors::CoreError;
use crate::models::estimate::BudgetEstimateRecord;
use crate::models::summary::SummaryTotals;
use crate::models::transaction::{TransactionDraft, TransactionId, TransactionRecord};

use super::traits::BudgetApi;

/// [`BudgetApi`] over HTTP with token authentication.
pub struct HttpBudgetApi {
    client: Client,
    base_url: String,
}

impl HttpBudgetApi {
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, authorization_value(token))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T, CoreError> {
        let response = check_status(builder.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse {what}: {e}")))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), CoreError> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// Value of the `Authorization` header for a session token.
pub fn authorization_value(token: &str) -> String {
    format!("Token {token}")
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Map a non-success status and its body to the error taxonomy.
pub fn error_for_status(status: StatusCode, body: &str) -> CoreError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.trim().is_empty());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CoreError::Auth(detail.unwrap_or_else(|| status.to_string()))
        }
        StatusCode::NOT_FOUND => CoreError::NotFound(detail.unwrap_or_default()),
        _ => CoreError::Api {
            status: status.as_u16(),
            detail,
        },
    }
}

async fn check_status(response: Response) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

#[async_trait]
impl BudgetApi for HttpBudgetApi {
    async fn login(&self, username: &str, password: &str) -> Result<String, CoreError> {
        tracing::debug!(%username, "POST /login/");
        let request = self
            .client
            .post(self.url("/login/"))
            .json(&LoginRequest { username, password });

        match self.fetch_json::<LoginResponse>(request, "login response").await {
            Ok(body) => Ok(body.token),
            // Wrong username/password comes back as 400 (or 401/403).
            Err(CoreError::Auth(_)) | Err(CoreError::Api { status: 400, .. }) => Err(CoreError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), CoreError> {
        tracing::debug!("POST /logout/");
        let request = self.authorized(self.client.post(self.url("/logout/")), token);
        self.send_empty(request).await
    }

    async fn summary(&self, token: &str, year: i32, month: u32) -> Result<SummaryTotals, CoreError> {
        tracing::debug!(year, month, "GET /summary/");
        let request = self
            .authorized(self.client.get(self.url("/summary/")), token)
            .query(&[("year", year.to_string()), ("month", month.to_string())]);
        self.fetch_json(request, "summary").await
    }

    async fn available_years(&self, token: &str) -> Result<Vec<i32>, CoreError> {
        tracing::debug!("GET /available-years/");
        let request = self.authorized(self.client.get(self.url("/available-years/")), token);
        self.fetch_json(request, "available years").await
    }

    async fn available_months(&self, token: &str, year: i32) -> Result<Vec<u32>, CoreError> {
        tracing::debug!(year, "GET /available-months/");
        let request = self
            .authorized(self.client.get(self.url("/available-months/")), token)
            .query(&[("year", year)]);
        self.fetch_json(request, "available months").await
    }

    async fn list_transactions(&self, token: &str) -> Result<Vec<TransactionRecord>, CoreError> {
        tracing::debug!("GET /transactions/");
        let request = self.authorized(self.client.get(self.url("/transactions/")), token);
        self.fetch_json(request, "transactions").await
    }

    async fn create_transaction(&self, token: &str, draft: &TransactionDraft) -> Result<(), CoreError> {
        tracing::debug!(category = %draft.category_name, "POST /transactions/");
        let request = self
            .authorized(self.client.post(self.url("/transactions/")), token)
            .json(draft);
        self.send_empty(request).await
    }

    async fn update_transaction(
        &self,
        token: &str,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<(), CoreError> {
        tracing::debug!(id, "PUT /transactions/{{id}}/");
        let request = self
            .authorized(self.client.put(self.url(&format!("/transactions/{id}/"))), token)
            .json(draft);
        self.send_empty(request).await
    }

    async fn delete_transaction(&self, token: &str, id: TransactionId) -> Result<(), CoreError> {
        tracing::debug!(id, "DELETE /transactions/{{id}}/");
        let request = self.authorized(self.client.delete(self.url(&format!("/transactions/{id}/"))), token);
        self.send_empty(request).await
    }

    async fn list_budget_estimates(&self, token: &str) -> Result<Vec<BudgetEstimateRecord>, CoreError> {
        tracing::debug!("GET /budget/");
        let request = self.authorized(self.client.get(self.url("/budget/")), token);
        self.fetch_json(request, "budget estimates").await
    }
}
