use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::document::mutators::EditError;
use crate::export::ExportError;
use crate::services::ServiceError;
use crate::storage::StorageError;
use crate::templates::TemplateError;
use crate::workspace::WorkspaceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Edit(e) => {
                let (status, code) = match e {
                    EditError::IndexOutOfBounds { .. } => (StatusCode::NOT_FOUND, "INDEX_OUT_OF_BOUNDS"),
                    EditError::EntryNotFound { .. } => (StatusCode::NOT_FOUND, "ENTRY_NOT_FOUND"),
                    EditError::EmptyValue(_) => (StatusCode::BAD_REQUEST, "EMPTY_VALUE"),
                    EditError::UnknownSkill(_) => (StatusCode::NOT_FOUND, "UNKNOWN_SKILL"),
                    EditError::UnknownLanguage(_) => (StatusCode::NOT_FOUND, "UNKNOWN_LANGUAGE"),
                };
                (status, code, e.to_string(), None)
            }
            AppError::Workspace(WorkspaceError::Edit(e)) => AppError::Edit(e.clone()).parts(),
            AppError::Workspace(e @ WorkspaceError::NoActiveEdit(_)) => {
                (StatusCode::CONFLICT, "NO_ACTIVE_EDIT", e.to_string(), None)
            }
            AppError::Workspace(e @ WorkspaceError::Snapshot(_)) => {
                tracing::error!("Edit snapshot failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
            AppError::Template(e) => (StatusCode::NOT_FOUND, "UNKNOWN_TEMPLATE", e.to_string(), None),
            AppError::Storage(e) => match e {
                StorageError::QuotaExceeded { .. } => (
                    StatusCode::INSUFFICIENT_STORAGE,
                    "QUOTA_EXCEEDED",
                    e.to_string(),
                    None,
                ),
                StorageError::DraftNotFound(_) => {
                    (StatusCode::NOT_FOUND, "DRAFT_NOT_FOUND", e.to_string(), None)
                }
                StorageError::EmptyName => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
                }
                StorageError::InvalidKey(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
                }
                StorageError::Io(_) | StorageError::Serialization(_) => {
                    tracing::error!("Storage error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        "A storage error occurred".to_string(),
                        None,
                    )
                }
            },
            AppError::Export(e) => match e {
                ExportError::NotReady(readiness) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXPORT_NOT_READY",
                    e.to_string(),
                    serde_json::to_value(readiness).ok(),
                ),
                ExportError::Template(t) => {
                    (StatusCode::NOT_FOUND, "UNKNOWN_TEMPLATE", t.to_string(), None)
                }
                ExportError::UnsupportedCharacters(chars) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNSUPPORTED_CHARACTERS",
                    e.to_string(),
                    Some(json!({ "characters": chars.iter().map(char::to_string).collect::<Vec<_>>() })),
                ),
                ExportError::UnknownFormat(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string(), None)
                }
                ExportError::Pdf(msg) => {
                    tracing::error!("PDF export failed: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "EXPORT_ERROR",
                        "The document could not be exported".to_string(),
                        None,
                    )
                }
            },
            AppError::Service(e) => {
                tracing::error!("External service error: {e}");
                let message = match e {
                    ServiceError::LocationUnavailable => e.to_string(),
                    _ => "An external service is unavailable".to_string(),
                };
                (StatusCode::BAD_GATEWAY, "SERVICE_UNAVAILABLE", message, None)
            }
            AppError::Catalog(e) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_CATEGORY", e.to_string(), None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collection;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_edit_error_maps_to_404() {
        let (status, body) = body_of(AppError::Edit(EditError::IndexOutOfBounds {
            collection: "experience",
            index: 3,
            len: 1,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "INDEX_OUT_OF_BOUNDS");
    }

    #[tokio::test]
    async fn test_quota_maps_to_507() {
        let (status, body) = body_of(AppError::Storage(StorageError::QuotaExceeded {
            needed: 10,
            quota: 5,
        }))
        .await;
        assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
        assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let (status, body) = body_of(AppError::Internal(anyhow::anyhow!("disk on fire"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"].as_str().unwrap().contains("disk"));
    }

    #[tokio::test]
    async fn test_unsupported_characters_listed() {
        let (status, body) =
            body_of(AppError::Export(ExportError::UnsupportedCharacters(vec!['김', '수']))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_CHARACTERS");
        assert_eq!(body["error"]["details"]["characters"], json!(["김", "수"]));
    }

    #[tokio::test]
    async fn test_no_active_edit_is_conflict() {
        let (status, _) =
            body_of(AppError::Workspace(WorkspaceError::NoActiveEdit(Collection::Projects))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
