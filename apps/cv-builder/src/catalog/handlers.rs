use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::catalog::{find_schools, search_skills, skill_groups, School, SchoolFilter, SkillGroup};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct SkillSearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillSearchResponse {
    pub skills: Vec<&'static str>,
}

/// GET /api/v1/catalog/skills
pub async fn handle_list_skill_groups() -> Json<&'static [SkillGroup]> {
    Json(skill_groups())
}

/// GET /api/v1/catalog/skills/search?q=&category=
pub async fn handle_search_skills(
    Query(query): Query<SkillSearchQuery>,
) -> Result<Json<SkillSearchResponse>, AppError> {
    let skills = search_skills(&query.q, query.category.as_deref())?;
    Ok(Json(SkillSearchResponse { skills }))
}

/// GET /api/v1/catalog/schools?type=&location=&q=
pub async fn handle_find_schools(Query(filter): Query<SchoolFilter>) -> Json<Vec<&'static School>> {
    Json(find_schools(&filter))
}
