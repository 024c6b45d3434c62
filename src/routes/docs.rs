//! Document API routes
//!
//! - `POST /create` creates an empty document and returns its id as text
//! - `PATCH /operations` applies one edit operation
//! - `GET /:document_id` returns the document

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::documents::DocumentDto;
use crate::error::{AppError, Result};
use crate::operation::Operation;
use crate::state::AppState;

/// Create the document router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_document))
        .route("/operations", patch(apply_operation))
        .route("/:document_id", get(get_document))
}

/// Create an empty document
async fn create_document(State(state): State<AppState>) -> String {
    state.documents().create().await
}

/// Apply one operation to a document
async fn apply_operation(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Operation>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(operation) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if let Err(e) = state.documents().apply(&operation).await {
        tracing::debug!(
            document_id = %operation.document_id(),
            operation = %operation,
            error = %e,
            "Rejected operation"
        );
        return Err(e);
    }
    Ok(StatusCode::OK)
}

/// Get a document
async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentDto>> {
    let document = state.documents().get(&document_id).await?;
    Ok(Json(document))
}
