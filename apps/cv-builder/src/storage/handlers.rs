use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::document::handlers::DocumentResponse;
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::autosave::save_if_dirty;
use crate::storage::{DraftSummary, StorageError, StorageUsage};

#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveDraftResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ClearDraftsResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct AutosaveResponse {
    pub saved: bool,
}

/// GET /api/v1/drafts
pub async fn handle_list_drafts(
    State(state): State<AppState>,
) -> Result<Json<Vec<DraftSummary>>, AppError> {
    Ok(Json(state.drafts.list_drafts().await?))
}

/// POST /api/v1/drafts
/// Saves the current document as a named draft.
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<(StatusCode, Json<SaveDraftResponse>), AppError> {
    let doc = state.workspace.read().await.document().clone();
    let id = state
        .drafts
        .save_draft(&doc, &req.name, req.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(SaveDraftResponse { id })))
}

/// GET /api/v1/drafts/usage
pub async fn handle_storage_usage(
    State(state): State<AppState>,
) -> Result<Json<StorageUsage>, AppError> {
    Ok(Json(state.drafts.storage_usage().await?))
}

/// POST /api/v1/drafts/autosave
/// Writes the autosave slot now instead of waiting for the next tick.
pub async fn handle_autosave_now(
    State(state): State<AppState>,
) -> Result<Json<AutosaveResponse>, AppError> {
    let saved = save_if_dirty(&state.workspace, &state.drafts).await?;
    Ok(Json(AutosaveResponse { saved }))
}

/// POST /api/v1/drafts/:id/load
/// Replaces the workspace document with the draft.
pub async fn handle_load_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state.drafts.load_draft(id).await?;
    let mut ws = state.workspace.write().await;
    ws.load(doc);
    info!("Loaded draft {id} into the workspace");
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/drafts/:id
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.drafts.delete_draft(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StorageError::DraftNotFound(id).into())
    }
}

/// DELETE /api/v1/drafts
/// Removes every named draft and the autosave slot.
pub async fn handle_clear_drafts(
    State(state): State<AppState>,
) -> Result<Json<ClearDraftsResponse>, AppError> {
    let removed = state.drafts.clear_all().await?;
    Ok(Json(ClearDraftsResponse { removed }))
}
