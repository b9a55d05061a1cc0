//! Thin client for the ClickHouse HTTP interface.
//!
//! SQL statements are POSTed as the request body; authentication uses the
//! `X-ClickHouse-User`/`X-ClickHouse-Key` headers and every request carries the
//! connection's `session_id` as a URL parameter. Result sets are requested in
//! `FORMAT JSON`, which wraps rows in a `{"meta": ..., "data": [...]}`
//! envelope.

use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use vectorflow::core::error::{Error, Result};

pub(crate) struct ClickHouseHttpClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    session_id: String,
}

impl ClickHouseHttpClient {
    /// Creates a client for one connection, generating a fresh session id.
    pub(crate) fn new(base_url: String, username: String, password: String) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            username,
            password,
            session_id: Uuid::new_v4().to_string(),
        })
    }

    async fn send(&self, sql: String, settings: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .post(&self.base_url)
            .query(&[("session_id", self.session_id.as_str())])
            .header("X-ClickHouse-User", &self.username)
            .header("X-ClickHouse-Key", &self.password);
        for (key, value) in settings {
            request = request.query(&[(key, value)]);
        }

        let response = request
            .body(sql)
            .send()
            .await
            .map_err(|e| Error::http(format!("ClickHouse request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(format!(
                "ClickHouse returned {status}: {}",
                body.trim()
            )));
        }
        Ok(response)
    }

    /// Executes a statement that produces no result set (DDL/DML).
    ///
    /// `settings` are attached as per-request ClickHouse settings.
    pub(crate) async fn execute(&self, sql: String, settings: &[(&str, &str)]) -> Result<()> {
        self.send(sql, settings).await.map(|_| ())
    }

    /// Runs a query and deserializes its `FORMAT JSON` response envelope.
    pub(crate) async fn query_json<T: DeserializeOwned>(&self, sql: String) -> Result<T> {
        let response = self.send(format!("{sql} FORMAT JSON"), &[]).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read ClickHouse response: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::api_format(format!("unexpected ClickHouse response: {e}")))
    }
}

impl std::fmt::Debug for ClickHouseHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseHttpClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
