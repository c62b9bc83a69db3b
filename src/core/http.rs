//! REST submitter shared by every venue
//!
//! Wraps a pooled `reqwest::Client`. Transport failures become
//! `ExchangeError::Network`; the status and raw body of any answered
//! request are handed back so each venue applies its own success rules.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::config::constants;
use crate::core::cancel::with_cancel;

/// Status and body of an answered HTTP request
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON into `T`
    pub fn json<T: DeserializeOwned>(&self) -> ExchangeResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ExchangeError::InvalidResponse(format!("{} (status {})", e, self.status))
        })
    }

    /// Best human-readable error text carried by the body.
    ///
    /// Looks for the usual `message`/`msg`/`error` fields, falling back to
    /// the raw body, then to the status line when the body is empty.
    pub fn error_message(&self) -> String {
        if let Ok(json) = serde_json::from_str::<Value>(&self.body) {
            for key in ["message", "msg", "error", "response"] {
                match json.get(key) {
                    Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                    Some(Value::Object(inner)) => {
                        if let Some(Value::String(s)) = inner.get("message") {
                            return s.clone();
                        }
                    }
                    _ => {}
                }
            }
        }
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            trimmed.to_string()
        }
    }
}

/// HTTP client used by all linking flows
#[derive(Debug, Clone)]
pub struct RestClient {
    inner: reqwest::Client,
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new(constants::http_timeout(), constants::http_connect_timeout())
    }
}

impl RestClient {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Self {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { inner }
    }

    /// GET `url`
    pub async fn get(&self, url: &str, cancel: &CancellationToken) -> ExchangeResult<RestResponse> {
        tracing::debug!(url = %url, "GET");
        let request = self.inner.get(url);
        self.execute(request, url, cancel).await
    }

    /// POST `body` as JSON to `url` with extra `headers`
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        headers: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> ExchangeResult<RestResponse> {
        tracing::debug!(url = %url, "POST");
        let mut request = self.inner.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        self.execute(request, url, cancel).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<RestResponse> {
        with_cancel(cancel, async {
            let response = request.send().await.map_err(|e| transport_error(url, e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| transport_error(url, e))?;
            tracing::debug!(url = %url, status = %status, "Response received");
            Ok(RestResponse { status, body })
        })
        .await
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ExchangeError {
    if err.is_timeout() {
        ExchangeError::Network(format!("request to {} timed out", url))
    } else {
        ExchangeError::Network(format!("request to {} failed ({})", url, err))
    }
}
