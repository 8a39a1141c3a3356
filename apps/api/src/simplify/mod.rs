//! Text simplification — the request/response lifecycle around one engine call.
//!
//! Flow: validate input → obtain cached engine → build submission →
//!       timed generation → length statistics.
//!
//! No retries happen at this layer. A failed request is terminal; any retry
//! is a new user-initiated request.

pub mod handlers;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::provider::EngineProvider;
use crate::engine::GenerationParams;
use crate::errors::AppError;

/// Instruction prefix prepended to every submission. T5-style models select
/// the task from the prefix, so it must be identical on every request.
pub const INSTRUCTION_PREFIX: &str = "simplify: ";

/// Upper bound on generated output, in generation units.
pub const MAX_OUTPUT_LENGTH: u32 = 150;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for simplification.
#[derive(Debug, Clone, Deserialize)]
pub struct SimplifyRequest {
    pub text: String,
}

/// Outcome of one successful simplification.
#[derive(Debug, Clone, Serialize)]
pub struct SimplificationResult {
    pub simplified_text: String,
    /// Wall-clock time spent inside the generation call.
    pub elapsed_seconds: f64,
    /// Unicode scalar count of the trimmed input.
    pub original_chars: usize,
    pub simplified_chars: usize,
    /// round((1 - simplified/original) * 100). Negative when the engine
    /// produced more text than it was given.
    pub reduction_percent: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Request lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full simplification lifecycle for one request.
///
/// Steps:
/// 1. Trim; empty input is rejected before any engine work.
/// 2. Obtain the memoized engine from the provider (initializes on first use).
/// 3. Prepend the instruction prefix to the trimmed input.
/// 4. One bounded, deterministic generation call, timed.
/// 5. First candidate becomes the result; length statistics are derived.
///
/// A generation failure does not invalidate the cached engine handle.
pub async fn simplify(
    provider: &EngineProvider,
    raw_text: &str,
) -> Result<SimplificationResult, AppError> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let engine = provider
        .get_engine()
        .await
        .map_err(|e| AppError::EngineInit(e.to_string()))?;

    let submission = format!("{INSTRUCTION_PREFIX}{trimmed}");
    let params = GenerationParams {
        max_length: MAX_OUTPUT_LENGTH,
        deterministic: true,
    };

    let start = Instant::now();
    let outputs = engine
        .generate(&submission, &params)
        .await
        .map_err(|e| AppError::Generation(e.to_string()))?;
    let elapsed_seconds = start.elapsed().as_secs_f64();

    let simplified_text = outputs
        .into_iter()
        .next()
        .map(|candidate| candidate.generated_text)
        .ok_or_else(|| AppError::Generation("engine returned no output".to_string()))?;

    let original_chars = trimmed.chars().count();
    let simplified_chars = simplified_text.chars().count();
    let reduction = reduction_percent(original_chars, simplified_chars);

    info!(
        "Simplified {original_chars} chars to {simplified_chars} chars ({reduction}%) in {elapsed_seconds:.2}s"
    );

    Ok(SimplificationResult {
        simplified_text,
        elapsed_seconds,
        original_chars,
        simplified_chars,
        reduction_percent: reduction,
    })
}

/// Proportional decrease in character count, as a rounded percentage.
/// Callers guarantee `original > 0`; the result can be negative.
pub fn reduction_percent(original: usize, simplified: usize) -> i32 {
    ((1.0 - simplified as f64 / original as f64) * 100.0).round() as i32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
