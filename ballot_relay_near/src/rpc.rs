use ballot_relay::LedgerError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Deserialize, Debug)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

/// A JSON-RPC client for a NEAR node. Cheap to share; reuses its connection pool.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        Ok(RpcClient {
            http,
            url: url.to_owned(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "ballot_relay",
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| LedgerError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;

        let result = check_response(response)?;
        serde_json::from_value(result).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
    }
}

// Query errors can show up either as a JSON-RPC error or inside the result
fn check_response(response: RpcResponse) -> Result<Value, LedgerError> {
    if let Some(error) = response.error {
        return Err(LedgerError::Rpc(error.to_string()));
    }

    let result = response
        .result
        .ok_or_else(|| LedgerError::MalformedResponse("missing result".to_owned()))?;

    if let Some(error) = result.get("error") {
        return Err(LedgerError::Rpc(error.to_string()));
    }

    Ok(result)
}
