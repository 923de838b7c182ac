//! Wire types and transport for the policy service.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::PolicyConfig;
use crate::error::{PolicyError, Result};

/// Body of a partial-evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileRequest {
    /// Query to evaluate, e.g. `data.app.orders.allow == true`.
    pub query: String,
    /// Caller-supplied input document.
    pub input: Value,
    /// References left unresolved, e.g. `["data.orders"]`.
    pub unknowns: Vec<String>,
}

/// Response of `POST /v1/compile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub result: Option<CompileResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileResult {
    /// Disjunction of conjunctions of residual expressions.
    #[serde(default)]
    pub queries: Option<Vec<Vec<Value>>>,
}

impl CompileResponse {
    /// The residual queries, if the response carried any.
    #[must_use]
    pub fn queries(&self) -> Option<&[Vec<Value>]> {
        self.result
            .as_ref()
            .and_then(|result| result.queries.as_deref())
    }
}

/// Response of the masks document lookup. `result` maps table name to
/// column name to mask rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaskResponse {
    #[serde(default)]
    pub result: Option<Value>,
}

/// Transport to a policy service.
pub trait PolicyClient: Send + Sync {
    /// Partially evaluates the policy with some references left unknown.
    fn compile(&self, request: &CompileRequest) -> Result<CompileResponse>;

    /// Fetches the masks document for `input`.
    fn masks(&self, input: &Value) -> Result<MaskResponse>;
}

/// Blocking HTTP client for an OPA-compatible service.
#[derive(Debug, Clone)]
pub struct HttpPolicyClient {
    http: reqwest::blocking::Client,
    compile_url: String,
    masks_url: String,
}

impl HttpPolicyClient {
    /// Builds a client with the configured timeout.
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PolicyError::Unreachable(e.to_string()))?;
        Ok(Self {
            http,
            compile_url: config.compile_url(),
            masks_url: config.masks_url(),
        })
    }

    fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!(url, "policy request");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|e| PolicyError::Unreachable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolicyError::BadResponse(format!("{url} returned {status}")));
        }
        response
            .json::<R>()
            .map_err(|e| PolicyError::BadResponse(format!("{url}: {e}")))
    }
}

impl PolicyClient for HttpPolicyClient {
    fn compile(&self, request: &CompileRequest) -> Result<CompileResponse> {
        self.post(&self.compile_url, request)
    }

    fn masks(&self, input: &Value) -> Result<MaskResponse> {
        self.post(&self.masks_url, &json!({ "input": input }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_request_shape() {
        let request = CompileRequest {
            query: String::from("data.app.allow == true"),
            input: json!({"user": "ann"}),
            unknowns: vec![String::from("data.orders")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "data.app.allow == true",
                "input": {"user": "ann"},
                "unknowns": ["data.orders"]
            })
        );
    }

    #[test]
    fn test_compile_response_queries() {
        let response: CompileResponse =
            serde_json::from_value(json!({"result": {"queries": [[]]}})).unwrap();
        assert_eq!(response.queries().map(<[_]>::len), Some(1));

        let response: CompileResponse = serde_json::from_value(json!({"result": {}})).unwrap();
        assert!(response.queries().is_none());

        let response: CompileResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.queries().is_none());
    }
}
