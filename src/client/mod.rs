//! Remote precise-tokenization client.
//!
//! The precise tier delegates to an HTTP service that runs real,
//! ChatML-aware tokenization server-side. [`HttpPreciseClient`] is the
//! default [`PreciseSource`]; the trait seam lets tests and embedders
//! substitute their own source.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::{PromptFields, TokenEstimate};
use crate::{Result, TallyError};

/// Fixed path of the precise-tokenization endpoint, relative to the base URL.
pub const PRECISE_ENDPOINT_PATH: &str = "/api/tokens/precise";

/// Default transport timeout for precise requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of precise token counts.
///
/// Implementations may fail; the counter recovers every failure with the
/// quick heuristic and never propagates it.
#[async_trait]
pub trait PreciseSource: Send + Sync {
    /// Compute exact per-model token counts for the given prompt fields.
    async fn tokenize(&self, fields: &PromptFields, models: &[String]) -> Result<TokenEstimate>;
}

/// HTTP client for the remote precise-tokenization service.
#[derive(Clone)]
pub struct HttpPreciseClient {
    http: Client,
    base_url: String,
}

impl HttpPreciseClient {
    /// Create a client against the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom transport timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TallyError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeRequest<'a> {
    system_text: &'a str,
    user_text: &'a str,
    assistant_text: &'a str,
    models: &'a [String],
}

#[derive(Deserialize)]
struct TokenizeResponse {
    results: BTreeMap<String, usize>,
}

#[async_trait]
impl PreciseSource for HttpPreciseClient {
    async fn tokenize(&self, fields: &PromptFields, models: &[String]) -> Result<TokenEstimate> {
        let url = format!("{}{}", self.base_url, PRECISE_ENDPOINT_PATH);

        let response = self
            .http
            .post(&url)
            .json(&TokenizeRequest {
                system_text: &fields.system_text,
                user_text: &fields.user_text,
                assistant_text: &fields.assistant_text,
                models,
            })
            .send()
            .await
            .map_err(|e| TallyError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TallyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TallyError::Http(e.to_string()))?;
        let parsed: TokenizeResponse = serde_json::from_str(&body)?;
        Ok(TokenEstimate::from_counts(parsed.results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = HttpPreciseClient::new("http://localhost:3000///").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let models = vec!["gpt-4o".to_string()];
        let request = TokenizeRequest {
            system_text: "s",
            user_text: "u",
            assistant_text: "",
            models: &models,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "systemText": "s",
                "userText": "u",
                "assistantText": "",
                "models": ["gpt-4o"],
            })
        );
    }

    #[test]
    fn response_parses_results_map() {
        let parsed: TokenizeResponse =
            serde_json::from_str(r#"{"results":{"gpt-4o":42,"claude-3.5-sonnet":39}}"#).unwrap();
        assert_eq!(parsed.results["gpt-4o"], 42);
        assert_eq!(parsed.results["claude-3.5-sonnet"], 39);
    }
}
