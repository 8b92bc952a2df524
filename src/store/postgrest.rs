//! `reqwest`-backed implementation of [`StoreGateway`] against a PostgREST
//! endpoint (`{base}/rest/v1/{table}`, `{base}/rest/v1/rpc/{name}`).

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::store::query::Query;
use crate::store::{StoreError, StoreGateway};

/// PostgREST's code for "JSON object requested, multiple (or no) rows
/// returned" — the single-row coercion miss.
const NO_ROWS_CODE: &str = "PGRST116";

pub struct PostgrestGateway {
    http: reqwest::Client,
    base: String,
    api_key: String,
    schema: Option<String>,
}

impl PostgrestGateway {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            schema: config.schema.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method.clone(), format!("{}/{path}", self.base))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key);
        if let Some(schema) = &self.schema {
            let header = match method {
                Method::GET | Method::HEAD => "Accept-Profile",
                _ => "Content-Profile",
            };
            req = req.header(header, schema);
        }
        req
    }

    async fn run(req: RequestBuilder) -> Result<Response, StoreError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Err(error_from_response(status, &body))
    }
}

/// Map a non-2xx PostgREST response body (`{code, message, details, hint}`)
/// into a `StoreError`.
fn error_from_response(status: StatusCode, body: &Value) -> StoreError {
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if code == NO_ROWS_CODE {
        return StoreError::NoRows;
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("http status {status}"));
    StoreError::Backend { code, message }
}

/// Writes return their representation as a bare object for single-row
/// inserts and an array for batches; normalize to a row list.
fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        row => vec![row],
    }
}

#[async_trait]
impl StoreGateway for PostgrestGateway {
    async fn select(&self, table: &str, query: Query) -> Result<Vec<Value>, StoreError> {
        let req = self.request(Method::GET, table).query(&query.to_params());
        let rows = Self::run(req).await?.json().await?;
        Ok(rows)
    }

    async fn select_one(&self, table: &str, query: Query) -> Result<Value, StoreError> {
        let req = self
            .request(Method::GET, table)
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&query.to_params());
        let row = Self::run(req).await?.json().await?;
        Ok(row)
    }

    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, StoreError> {
        let req = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        let body = Self::run(req).await?.json().await?;
        Ok(into_rows(body))
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, StoreError> {
        let req = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&[("on_conflict", on_conflict)])
            .json(&row);
        let row = Self::run(req).await?.json().await?;
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let req = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&query.to_params())
            .json(&patch);
        let body = Self::run(req).await?.json().await?;
        Ok(into_rows(body))
    }

    async fn delete(&self, table: &str, query: Query) -> Result<(), StoreError> {
        let req = self.request(Method::DELETE, table).query(&query.to_params());
        Self::run(req).await?;
        Ok(())
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value, StoreError> {
        let req = self
            .request(Method::POST, &format!("rpc/{name}"))
            .json(&params);
        let resp = req.send().await?;
        if resp.status().is_success() {
            let body = resp.json().await?;
            return Ok(body);
        }
        // Procedure failures carry the backend's error body verbatim so the
        // caller can surface it untouched.
        let payload = resp.json().await.unwrap_or(Value::Null);
        Err(StoreError::Rpc { payload })
    }
}
