//! Implements the `ExpenseStore` trait against the expense API over HTTP.
//!
//! Error mapping follows one policy everywhere: transport failures become
//! `ApiError::Network`, a 401 becomes `ApiError::Auth`, any other non-2xx becomes
//! `ApiError::Server` with the message pulled out of the body when the server sent one.
//! Malformed payloads on collection and aggregate endpoints are coerced to empty defaults
//! with a warning rather than raised.

use crate::api::{DateRange, ExpenseStore, ListRequest, LoginResponse};
use crate::error::ApiError;
use crate::model::{CategoryTotal, Expense, MonthSummary, NewExpense};
use crate::session::{Session, User};
use crate::{Config, Result};
use anyhow::Context;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};
use url::Url;

pub(super) struct HttpStore {
    client: reqwest::Client,
    /// Normalized base URL, no trailing slash, e.g. `http://127.0.0.1:5001/api`.
    base: String,
    token: Option<String>,
}

impl HttpStore {
    pub(super) fn new(config: &Config, session: Option<&Session>) -> Result<Self> {
        let base = config.api_base_url().trim_end_matches('/').to_string();
        let _ = Url::parse(&base)
            .with_context(|| format!("Invalid API base URL '{base}' in config"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            token: session.map(|s| s.access_token().to_string()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base, path);
        trace!("{method} {url}");
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends the request and applies the status-code policy described in the module docs.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).await
    }

    /// Fetches a JSON payload, coercing anything unreadable to `Value::Null`.
    async fn send_lenient_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = self.send(builder).await?;
        Ok(match response.json::<Value>().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Response body was not JSON, treating as empty: {e}");
                Value::Null
            }
        })
    }
}

#[async_trait::async_trait]
impl ExpenseStore for HttpStore {
    async fn list(&mut self, request: &ListRequest) -> Result<Vec<Expense>> {
        let mut query: Vec<(&str, String)> = vec![
            ("page", request.page.to_string()),
            ("page_size", request.page_size.to_string()),
        ];
        if let Some(from) = request.from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = request.to {
            query.push(("to", to.to_string()));
        }
        let builder = self.request(Method::GET, "expenses").query(&query);
        let value = self.send_lenient_json(builder).await?;
        Ok(decode_collection(value, "expense list"))
    }

    async fn create(&mut self, payload: &NewExpense) -> Result<Expense> {
        let builder = self.request(Method::POST, "expenses").json(payload);
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .context("Malformed response to expense creation")
    }

    async fn update(&mut self, id: i64, payload: &NewExpense) -> Result<Expense> {
        let builder = self
            .request(Method::PUT, &format!("expenses/{id}"))
            .json(payload);
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .with_context(|| format!("Malformed response to update of expense {id}"))
    }

    async fn delete(&mut self, id: i64) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("expenses/{id}"));
        let _ = self.send(builder).await?;
        Ok(())
    }

    async fn month_summary(&mut self, year: i32, month: u32) -> Result<MonthSummary> {
        let builder = self.request(Method::GET, "summary/month").query(&[
            ("year", year.to_string()),
            ("month", month.to_string()),
        ]);
        let value = self.send_lenient_json(builder).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    async fn category_summary(&mut self, range: &DateRange) -> Result<Vec<CategoryTotal>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(from) = range.from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = range.to {
            query.push(("to", to.to_string()));
        }
        let builder = self
            .request(Method::GET, "summary/by_category")
            .query(&query);
        let value = self.send_lenient_json(builder).await?;
        Ok(decode_collection(value, "category summary"))
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        let builder = self.request(Method::POST, "auth/login").json(&body);
        let response = self.send(builder).await?;
        response.json().await.context("Malformed login response")
    }

    async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User> {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        let builder = self.request(Method::POST, "auth/register").json(&body);
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .context("Malformed registration response")
    }
}

/// Maps a 401 to `ApiError::Auth` and any other non-2xx to `ApiError::Server`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Auth.into());
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: server_message(&body),
        }
        .into());
    }
    Ok(response)
}

/// Pulls a human-readable message out of an error body. The server uses either
/// `{"error": "..."}` or `{"errors": [...]}`; anything else falls back to the raw body or a
/// generic message.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(errors) = value.get("errors") {
            return errors.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "the server returned an error with no details".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decodes a JSON array element by element. A non-array payload yields an empty collection;
/// an element that does not decode is skipped. Both degrade the display, never the command.
fn decode_collection<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    let Value::Array(elements) = value else {
        warn!("Expected a JSON array for {what}, got something else; treating as empty");
        return Vec::new();
    };
    let mut decoded = Vec::with_capacity(elements.len());
    for element in elements {
        match serde_json::from_value(element) {
            Ok(item) => decoded.push(item),
            Err(e) => warn!("Skipping malformed element in {what}: {e}"),
        }
    }
    decoded
}
