use axum::{extract::Path, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::ResumeType;
use crate::templates::registry::{
    all_templates, get_template, is_section_visible, optional_sections, required_sections,
    SectionId, TemplateDescriptor,
};

#[derive(Serialize)]
pub struct SectionVisibility {
    pub template: String,
    pub section: SectionId,
    pub visible: bool,
}

#[derive(Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: &'static TemplateDescriptor,
    pub required_sections: Vec<SectionId>,
    pub optional_sections: Vec<SectionId>,
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<&'static [TemplateDescriptor]> {
    Json(all_templates())
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(Path(id): Path<String>) -> Result<Json<TemplateDetail>, AppError> {
    let resume_type = ResumeType::new(id);
    let template = get_template(&resume_type)?;
    Ok(Json(TemplateDetail {
        template,
        required_sections: required_sections(&resume_type)?,
        optional_sections: optional_sections(&resume_type)?,
    }))
}

/// GET /api/v1/templates/:id/sections/:section
pub async fn handle_section_visibility(
    Path((id, section)): Path<(String, SectionId)>,
) -> Result<Json<SectionVisibility>, AppError> {
    let resume_type = ResumeType::new(id);
    let visible = is_section_visible(&resume_type, section)?;
    Ok(Json(SectionVisibility {
        template: resume_type.to_string(),
        section,
        visible,
    }))
}
