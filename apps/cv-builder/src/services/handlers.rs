use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::translation::{is_supported_language, SUPPORTED_LANGUAGES};
use crate::services::{translate, TranslationOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
}

/// POST /api/v1/translate
/// Always 200 for supported pairs; service failures are reported in the body.
pub async fn handle_translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslationOutcome>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    for code in [&req.source, &req.target] {
        if !is_supported_language(code) {
            return Err(AppError::Validation(format!(
                "Unsupported language code '{code}'"
            )));
        }
    }
    let outcome = translate(state.translator.as_ref(), &req.text, &req.source, &req.target).await;
    Ok(Json(outcome))
}

/// GET /api/v1/translate/languages
pub async fn handle_list_languages() -> Json<Vec<LanguageOption>> {
    Json(
        SUPPORTED_LANGUAGES
            .iter()
            .map(|&(code, name)| LanguageOption { code, name })
            .collect(),
    )
}
