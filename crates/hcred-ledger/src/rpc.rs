//! JSON-RPC transport.
//!
//! Thin wrapper over reqwest that sends `jsonrpc: "2.0"` envelopes and
//! splits the response into `result` or a structured failure. Error
//! *classification* (user-rejected, revert kinds, nonexistent token) happens
//! in the client layer, where the method name and token id are known.

use serde_json::Value;
use url::Url;

/// Low-level outcome of a JSON-RPC exchange, before classification.
#[derive(Debug)]
pub(crate) enum RpcFailure {
    /// Transport-level failure.
    Http(reqwest::Error),
    /// Non-success HTTP status from the endpoint.
    Status(u16),
    /// The response body was not valid JSON.
    InvalidJson(reqwest::Error),
    /// The endpoint returned a JSON-RPC error object.
    ErrorObject {
        code: i64,
        message: String,
        /// Raw revert data, when the provider includes it.
        data: Option<String>,
    },
    /// The response contained neither `result` nor `error`.
    MissingResult,
}

#[derive(Debug, Clone)]
pub(crate) struct RpcTransport {
    http: reqwest::Client,
    url: Url,
}

impl RpcTransport {
    pub(crate) fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// Send a JSON-RPC request and return the `result` field.
    pub(crate) async fn call(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let resp = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(RpcFailure::Http)?;

        if !resp.status().is_success() {
            return Err(RpcFailure::Status(resp.status().as_u16()));
        }

        let json: Value = resp.json().await.map_err(RpcFailure::InvalidJson)?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            // Revert data is a hex string under `data`, or nested under
            // `data.data` on some providers.
            let data = error
                .get("data")
                .and_then(|d| {
                    d.as_str()
                        .map(str::to_string)
                        .or_else(|| d.get("data").and_then(Value::as_str).map(str::to_string))
                })
                .filter(|s| s.starts_with("0x"));
            return Err(RpcFailure::ErrorObject {
                code,
                message,
                data,
            });
        }

        match json.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(RpcFailure::MissingResult),
        }
    }
}
