/// Engine — the single point of entry for all text-generation calls in ClearSpeak.
///
/// ARCHITECTURAL RULE: No other module may talk to the inference backend
/// directly. All generation MUST go through the `TextGenerator` trait.
///
/// Model: t5-small (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub mod hf_client;
pub mod provider;

/// The model used for every simplification call.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "t5-small";

/// Errors produced by the engine layer. The request handler classifies them
/// by phase: a failure out of the factory is an initialization error, a
/// failure out of `generate` is a generation error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Parameters for a single generation call.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Upper bound on generated output, in generation units.
    pub max_length: u32,
    /// When true the engine picks the highest-probability continuation at
    /// each step, so identical input yields identical output.
    pub deterministic: bool,
}

/// One generated candidate, as returned by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Black-box text-to-text generation capability.
///
/// Implementations:
///   - `HfInferenceClient` (production, hosted inference API)
///   - stub engines in tests
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        input: &str,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedText>, EngineError>;
}
