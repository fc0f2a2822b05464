pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::document::handlers as document;
use crate::export::handlers as export;
use crate::services::handlers as services;
use crate::state::AppState;
use crate::storage::handlers as drafts;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document
        .route(
            "/api/v1/document",
            get(document::handle_get_document).put(document::handle_import_document),
        )
        .route("/api/v1/document/reset", post(document::handle_reset_document))
        .route("/api/v1/document/type", put(document::handle_set_type))
        .route(
            "/api/v1/document/header-color",
            put(document::handle_set_header_color),
        )
        .route(
            "/api/v1/document/research-interests",
            put(document::handle_set_research_interests),
        )
        .route(
            "/api/v1/document/references",
            put(document::handle_set_references),
        )
        .route(
            "/api/v1/document/personal-info",
            patch(document::handle_update_personal_info),
        )
        .route(
            "/api/v1/document/personal-info/location",
            post(document::handle_detect_location),
        )
        .route("/api/v1/document/validation", get(document::handle_validate))
        // Skills and languages
        .route("/api/v1/document/skills", post(document::handle_add_skill))
        .route(
            "/api/v1/document/skills/reorder",
            post(document::handle_reorder_skills),
        )
        .route(
            "/api/v1/document/skills/:index",
            patch(document::handle_update_skill).delete(document::handle_remove_skill),
        )
        .route(
            "/api/v1/document/languages",
            post(document::handle_add_language),
        )
        .route(
            "/api/v1/document/languages/reorder",
            post(document::handle_reorder_languages),
        )
        .route(
            "/api/v1/document/languages/:index",
            patch(document::handle_update_language).delete(document::handle_remove_language),
        )
        .route(
            "/api/v1/document/skill-categories/:id/skills",
            post(document::handle_add_category_skill),
        )
        .route(
            "/api/v1/document/skill-categories/:id/skills/:index",
            delete(document::handle_remove_category_skill),
        )
        // Collection entries and edit sessions
        .route(
            "/api/v1/document/entries/:collection",
            post(document::handle_add_entry),
        )
        .route(
            "/api/v1/document/entries/:collection/new",
            post(document::handle_begin_new_entry),
        )
        .route(
            "/api/v1/document/entries/:collection/reorder",
            post(document::handle_reorder_entry),
        )
        .route(
            "/api/v1/document/entries/:collection/by-id/:id",
            put(document::handle_update_entry_by_id).delete(document::handle_delete_entry_by_id),
        )
        .route(
            "/api/v1/document/entries/:collection/:index",
            put(document::handle_update_entry).delete(document::handle_delete_entry),
        )
        .route(
            "/api/v1/document/entries/:collection/:index/edit",
            post(document::handle_begin_edit),
        )
        .route(
            "/api/v1/document/entries/:collection/:index/edit/confirm",
            post(document::handle_confirm_edit),
        )
        .route(
            "/api/v1/document/entries/:collection/:index/edit/cancel",
            post(document::handle_cancel_edit),
        )
        // Templates
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        .route(
            "/api/v1/templates/:id/sections/:section",
            get(templates::handle_section_visibility),
        )
        // Catalogs
        .route("/api/v1/catalog/skills", get(catalog::handle_list_skill_groups))
        .route(
            "/api/v1/catalog/skills/search",
            get(catalog::handle_search_skills),
        )
        .route("/api/v1/catalog/schools", get(catalog::handle_find_schools))
        // Export
        .route("/api/v1/export/:format", post(export::handle_export))
        // Drafts
        .route(
            "/api/v1/drafts",
            get(drafts::handle_list_drafts)
                .post(drafts::handle_save_draft)
                .delete(drafts::handle_clear_drafts),
        )
        .route("/api/v1/drafts/usage", get(drafts::handle_storage_usage))
        .route("/api/v1/drafts/autosave", post(drafts::handle_autosave_now))
        .route("/api/v1/drafts/:id", delete(drafts::handle_delete_draft))
        .route("/api/v1/drafts/:id/load", post(drafts::handle_load_draft))
        // Translation
        .route("/api/v1/translate", post(services::handle_translate))
        .route(
            "/api/v1/translate/languages",
            get(services::handle_list_languages),
        )
        .with_state(state)
}
