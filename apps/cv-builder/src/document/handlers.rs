use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::dispatch_collection;
use crate::document::mutators::{self, EditError};
use crate::document::progress::{summarize, ProgressSummary};
use crate::document::validation::{
    duplicate_entry_ids, field_message, validate_personal_info, ValidationReport,
};
use crate::errors::AppError;
use crate::models::{
    Collection, Entry, EntryId, PersonalField, ProficiencyLevel, ResumeDocument, ResumeType,
};
use crate::services::{detect_location, Coordinates};
use crate::state::AppState;
use crate::templates::get_template;
use crate::workspace::{EditSession, Workspace};

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

/// The document plus everything derived from it. Returned by every document endpoint.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: ResumeDocument,
    pub progress: ProgressSummary,
    pub editing: BTreeMap<Collection, EditSession>,
    pub revision: u64,
}

impl DocumentResponse {
    pub fn from_workspace(ws: &Workspace) -> Self {
        Self {
            document: ws.document().clone(),
            progress: summarize(ws.document()),
            editing: ws.sessions().clone(),
            revision: ws.revision(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonalInfoResponse {
    #[serde(flatten)]
    pub state: DocumentResponse,
    /// Inline messages for the fields touched by this request.
    pub field_messages: BTreeMap<PersonalField, &'static str>,
}

#[derive(Debug, Deserialize)]
pub struct TypeRequest {
    #[serde(rename = "type")]
    pub resume_type: ResumeType,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(rename = "type")]
    pub resume_type: Option<ResumeType>,
}

#[derive(Debug, Deserialize)]
pub struct HeaderColorRequest {
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LanguagePatch {
    pub name: Option<String>,
    pub proficiency: Option<ProficiencyLevel>,
}

fn parse_details<D: serde::de::DeserializeOwned>(
    collection: Collection,
    body: Value,
) -> Result<D, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid {collection} entry: {e}")))
}

fn skill_id(doc: &ResumeDocument, index: usize) -> Result<EntryId, EditError> {
    doc.skills
        .get(index)
        .map(|s| s.id)
        .ok_or(EditError::IndexOutOfBounds {
            collection: "skills",
            index,
            len: doc.skills.len(),
        })
}

fn language_id(doc: &ResumeDocument, index: usize) -> Result<EntryId, EditError> {
    doc.languages
        .get(index)
        .map(|l| l.id)
        .ok_or(EditError::IndexOutOfBounds {
            collection: "languages",
            index,
            len: doc.languages.len(),
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Whole document
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<DocumentResponse> {
    let ws = state.workspace.read().await;
    Json(DocumentResponse::from_workspace(&ws))
}

/// PUT /api/v1/document
/// Replaces the workspace with an imported document.
pub async fn handle_import_document(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<DocumentResponse>, AppError> {
    get_template(&document.resume_type)?;
    let duplicates = duplicate_entry_ids(&document);
    if !duplicates.is_empty() {
        let ids: Vec<String> = duplicates.iter().map(EntryId::to_string).collect();
        return Err(AppError::Validation(format!(
            "Entry ids must be unique; repeated: {}",
            ids.join(", ")
        )));
    }
    let mut ws = state.workspace.write().await;
    info!("Importing {} document", document.resume_type);
    ws.load(document);
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/reset
/// Body is optional; without a type the configured default template is used.
pub async fn handle_reset_document(
    State(state): State<AppState>,
    body: Option<Json<ResetRequest>>,
) -> Result<Json<DocumentResponse>, AppError> {
    let resume_type = body
        .and_then(|Json(req)| req.resume_type)
        .unwrap_or_else(|| state.config.default_template.clone());
    get_template(&resume_type)?;
    let mut ws = state.workspace.write().await;
    info!("Resetting document to a blank {resume_type}");
    ws.reset(resume_type);
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PUT /api/v1/document/type
pub async fn handle_set_type(
    State(state): State<AppState>,
    Json(req): Json<TypeRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    get_template(&req.resume_type)?;
    let mut ws = state.workspace.write().await;
    ws.apply(|doc| mutators::set_document_type(doc, req.resume_type));
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PUT /api/v1/document/header-color
pub async fn handle_set_header_color(
    State(state): State<AppState>,
    Json(req): Json<HeaderColorRequest>,
) -> Json<DocumentResponse> {
    let mut ws = state.workspace.write().await;
    ws.apply(|doc| mutators::set_header_color(doc, req.color.as_deref()));
    Json(DocumentResponse::from_workspace(&ws))
}

/// PUT /api/v1/document/research-interests
pub async fn handle_set_research_interests(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> Json<DocumentResponse> {
    let mut ws = state.workspace.write().await;
    ws.apply(|doc| mutators::set_research_interests(doc, req.items));
    Json(DocumentResponse::from_workspace(&ws))
}

/// PUT /api/v1/document/references
pub async fn handle_set_references(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> Json<DocumentResponse> {
    let mut ws = state.workspace.write().await;
    ws.apply(|doc| mutators::set_references(doc, req.items));
    Json(DocumentResponse::from_workspace(&ws))
}

// ────────────────────────────────────────────────────────────────────────────
// Personal info
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/document/personal-info
/// Body is a partial map of field name to new value.
pub async fn handle_update_personal_info(
    State(state): State<AppState>,
    Json(patch): Json<BTreeMap<PersonalField, String>>,
) -> Json<PersonalInfoResponse> {
    let field_messages = patch
        .iter()
        .filter_map(|(field, value)| field_message(*field, value).map(|m| (*field, m)))
        .collect();

    let mut ws = state.workspace.write().await;
    if !patch.is_empty() {
        ws.apply(|doc| {
            patch.into_iter().fold(doc.clone(), |next, (field, value)| {
                mutators::update_personal_info(&next, field, value)
            })
        });
    }
    Json(PersonalInfoResponse {
        state: DocumentResponse::from_workspace(&ws),
        field_messages,
    })
}

/// POST /api/v1/document/personal-info/location
/// Resolves a place name and stores it as the location. The lookup runs before
/// the workspace lock is taken.
pub async fn handle_detect_location(
    State(state): State<AppState>,
    body: Option<Json<LocationRequest>>,
) -> Result<Json<DocumentResponse>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let coordinates = match (req.latitude, req.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "latitude and longitude must be given together".to_string(),
            ))
        }
    };

    let location = detect_location(state.locator.as_ref(), coordinates).await?;

    let mut ws = state.workspace.write().await;
    ws.apply(|doc| mutators::update_personal_info(doc, PersonalField::Location, location));
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// GET /api/v1/document/validation
pub async fn handle_validate(State(state): State<AppState>) -> Json<ValidationReport> {
    let ws = state.workspace.read().await;
    Json(validate_personal_info(&ws.document().personal_info))
}

// ────────────────────────────────────────────────────────────────────────────
// Skills and languages
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/document/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::add_skill(doc, &req.name))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PATCH /api/v1/document/skills/:index
/// Renames the skill and/or sets its 1-5 score.
pub async fn handle_update_skill(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(patch): Json<SkillPatch>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| {
        let id = skill_id(doc, index)?;
        let mut next = doc.clone();
        if let Some(name) = &patch.name {
            next = mutators::rename_skill(&next, index, name)?;
        }
        if let Some(score) = patch.score {
            next = mutators::set_skill_score(&next, &id, score)?;
        }
        Ok::<_, EditError>(next)
    })?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/document/skills/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::remove_skill(doc, index))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/skills/reorder
pub async fn handle_reorder_skills(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::reorder_skills(doc, req.from, req.to))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/languages
pub async fn handle_add_language(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::add_language(doc, &req.name))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PATCH /api/v1/document/languages/:index
pub async fn handle_update_language(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(patch): Json<LanguagePatch>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| {
        let id = language_id(doc, index)?;
        let mut next = doc.clone();
        if let Some(name) = &patch.name {
            next = mutators::rename_language(&next, index, name)?;
        }
        if let Some(level) = patch.proficiency {
            next = mutators::set_language_proficiency(&next, &id, level)?;
        }
        Ok::<_, EditError>(next)
    })?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/document/languages/:index
pub async fn handle_remove_language(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::remove_language(doc, index))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/languages/reorder
pub async fn handle_reorder_languages(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::reorder_languages(doc, req.from, req.to))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/skill-categories/:id/skills
pub async fn handle_add_category_skill(
    State(state): State<AppState>,
    Path(category): Path<EntryId>,
    Json(req): Json<NameRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::add_skill_to_category(doc, &category, &req.name))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/document/skill-categories/:id/skills/:index
pub async fn handle_remove_category_skill(
    State(state): State<AppState>,
    Path((category, index)): Path<(EntryId, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.commit(|doc| mutators::remove_skill_from_category(doc, &category, index))?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

// ────────────────────────────────────────────────────────────────────────────
// Collection entries
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/document/entries/:collection
/// Body is the entry's details; a fresh id is assigned.
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    Json(body): Json<Value>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    dispatch_collection!(collection, D => {
        let details: D = parse_details(collection, body)?;
        ws.apply(|doc| mutators::add_entry(doc, Entry::new(details)));
    });
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/entries/:collection/new
/// Appends an entry (blank unless a body is given) and opens it for editing.
pub async fn handle_begin_new_entry(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    body: Option<Json<Value>>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    dispatch_collection!(collection, D => {
        let details: D = match body {
            Some(Json(body)) => parse_details(collection, body)?,
            None => D::default(),
        };
        ws.begin_new_entry(Entry::new(details));
    });
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PUT /api/v1/document/entries/:collection/:index
/// Replaces the details of the entry at `index`; its id is kept.
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((collection, index)): Path<(Collection, usize)>,
    Json(body): Json<Value>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    dispatch_collection!(collection, D => {
        let details: D = parse_details(collection, body)?;
        ws.commit(|doc| {
            let entries = <D as crate::models::CollectionItem>::entries(doc);
            let id = entries
                .get(index)
                .map(|e| e.id)
                .ok_or(EditError::IndexOutOfBounds {
                    collection: collection.as_str(),
                    index,
                    len: entries.len(),
                })?;
            mutators::update_entry(doc, index, Entry { id, details })
        })?;
    });
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/document/entries/:collection/:index
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((collection, index)): Path<(Collection, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.delete_entry(collection, index)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// PUT /api/v1/document/entries/:collection/by-id/:id
pub async fn handle_update_entry_by_id(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, EntryId)>,
    Json(body): Json<Value>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    dispatch_collection!(collection, D => {
        let details: D = parse_details(collection, body)?;
        ws.commit(|doc| mutators::update_entry_by_id(doc, &id, details))?;
    });
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// DELETE /api/v1/document/entries/:collection/by-id/:id
pub async fn handle_delete_entry_by_id(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, EntryId)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.delete_entry_by_id(collection, &id)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/entries/:collection/reorder
pub async fn handle_reorder_entry(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.reorder_entry(collection, req.from, req.to)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

// ────────────────────────────────────────────────────────────────────────────
// Edit sessions
// ────────────────────────────────────────────────────────────────────────────

fn check_focus(ws: &Workspace, collection: Collection, index: usize) -> Result<(), AppError> {
    match ws.editing(collection) {
        Some(session) if session.index == index => Ok(()),
        _ => Err(crate::workspace::WorkspaceError::NoActiveEdit(collection).into()),
    }
}

/// POST /api/v1/document/entries/:collection/:index/edit
pub async fn handle_begin_edit(
    State(state): State<AppState>,
    Path((collection, index)): Path<(Collection, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    ws.begin_edit(collection, index)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/entries/:collection/:index/edit/confirm
pub async fn handle_confirm_edit(
    State(state): State<AppState>,
    Path((collection, index)): Path<(Collection, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    check_focus(&ws, collection, index)?;
    ws.confirm_edit(collection)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}

/// POST /api/v1/document/entries/:collection/:index/edit/cancel
pub async fn handle_cancel_edit(
    State(state): State<AppState>,
    Path((collection, index)): Path<(Collection, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut ws = state.workspace.write().await;
    check_focus(&ws, collection, index)?;
    ws.cancel_edit(collection)?;
    Ok(Json(DocumentResponse::from_workspace(&ws)))
}
