//! HTTP client for the Hugging Face Inference API.
//!
//! Wire contract for the text2text-generation task:
//!   request  `{ inputs, parameters: { max_length, do_sample }, options: { wait_for_model } }`
//!   response `[ { generated_text } ]`
//!   error    `{ error }`

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::provider::EngineFactory;
use crate::engine::{EngineError, GeneratedText, GenerationParams, TextGenerator, MODEL};

const HF_API_BASE: &str = "https://api-inference.huggingface.co";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct HfErrorBody {
    error: String,
}

/// Subset of the model status endpoint's response; both fields are absent
/// on some deployments, so the probe only requires a 2xx status.
#[derive(Debug, Deserialize)]
struct HfModelStatus {
    state: Option<String>,
    loaded: Option<bool>,
}

/// Inference API client for the fixed simplification model.
pub struct HfInferenceClient {
    client: Client,
    api_token: Option<String>,
}

impl HfInferenceClient {
    /// Builds the HTTP client and probes the model status endpoint, so an
    /// unreachable backend or unknown model surfaces here instead of on the
    /// first generation call.
    pub async fn connect(api_token: Option<String>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EngineError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        let hf = Self { client, api_token };
        hf.probe_status().await?;
        Ok(hf)
    }

    async fn probe_status(&self) -> Result<(), EngineError> {
        let url = format!("{HF_API_BASE}/status/{MODEL}");
        let response = self.with_auth(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HfErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(EngineError::Unavailable(format!(
                "model status check failed (status {}): {message}",
                status.as_u16()
            )));
        }

        let model_status: HfModelStatus = response.json().await?;
        debug!(
            "Model {MODEL} status: state={:?} loaded={:?}",
            model_status.state, model_status.loaded
        );

        Ok(())
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl TextGenerator for HfInferenceClient {
    /// One generation attempt per call. Retrying is a user decision made at
    /// the request layer, so transient failures are returned, not retried.
    async fn generate(
        &self,
        input: &str,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedText>, EngineError> {
        let request_body = HfRequest {
            inputs: input,
            parameters: HfParameters {
                max_length: params.max_length,
                do_sample: !params.deterministic,
            },
            options: HfOptions {
                wait_for_model: true,
            },
        };

        let url = format!("{HF_API_BASE}/models/{MODEL}");
        let response = self
            .with_auth(self.client.post(&url))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HfErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(EngineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let outputs: Vec<GeneratedText> = response.json().await?;

        debug!("Generation returned {} candidate(s)", outputs.len());

        Ok(outputs)
    }
}

/// Production factory: connects an `HfInferenceClient` on first use.
pub struct HfEngineFactory {
    pub api_token: Option<String>,
}

#[async_trait]
impl EngineFactory for HfEngineFactory {
    async fn create(&self) -> Result<Arc<dyn TextGenerator>, EngineError> {
        let client = HfInferenceClient::connect(self.api_token.clone()).await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = HfRequest {
            inputs: "simplify: the lessee shall remit",
            parameters: HfParameters {
                max_length: 150,
                do_sample: false,
            },
            options: HfOptions {
                wait_for_model: true,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "simplify: the lessee shall remit");
        assert_eq!(json["parameters"]["max_length"], 150);
        assert_eq!(json["parameters"]["do_sample"], false);
        assert_eq!(json["options"]["wait_for_model"], true);
    }

    #[test]
    fn test_response_body_parses() {
        let json = r#"[{"generated_text": "Pay rent every month."}]"#;
        let outputs: Vec<GeneratedText> = serde_json::from_str(json).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].generated_text, "Pay rent every month.");
    }

    #[test]
    fn test_error_body_parses() {
        let json = r#"{"error": "Model t5-small is currently loading"}"#;
        let parsed: HfErrorBody = serde_json::from_str(json).unwrap();
        assert!(parsed.error.contains("loading"));
    }

    #[test]
    fn test_model_status_parses_partial_fields() {
        let json = r#"{"state": "Loadable"}"#;
        let status: HfModelStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state.as_deref(), Some("Loadable"));
        assert!(status.loaded.is_none());
    }
}
