//! Axum route handlers for the Simplification API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::simplify::{simplify, SimplificationResult, SimplifyRequest};
use crate::state::AppState;

/// POST /api/v1/simplify
///
/// Runs the full request lifecycle: validation, cached engine lookup, one
/// bounded deterministic generation call, timing and length statistics.
pub async fn handle_simplify(
    State(state): State<AppState>,
    Json(request): Json<SimplifyRequest>,
) -> Result<Json<SimplificationResult>, AppError> {
    let result = simplify(state.provider.as_ref(), &request.text).await?;

    Ok(Json(result))
}
