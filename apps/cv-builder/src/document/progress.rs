use serde::{Deserialize, Serialize};

use crate::document::validation::{validate_personal_info, FieldError};
use crate::models::ResumeDocument;

/// The fixed checkpoints that make up completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    BasicInfo,
    Skills,
    Languages,
    WorkOrStudy,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::BasicInfo,
        Milestone::Skills,
        Milestone::Languages,
        Milestone::WorkOrStudy,
    ];

    pub fn is_met(&self, doc: &ResumeDocument) -> bool {
        match self {
            Milestone::BasicInfo => {
                let p = &doc.personal_info;
                [&p.name, &p.email, &p.phone, &p.location]
                    .iter()
                    .all(|v| !v.trim().is_empty())
            }
            Milestone::Skills => !doc.skills.is_empty(),
            Milestone::Languages => !doc.languages.is_empty(),
            Milestone::WorkOrStudy => {
                !doc.experience.is_empty() || !doc.education.is_empty() || !doc.projects.is_empty()
            }
        }
    }
}

/// Per-step checkmarks for the builder's navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub basic_info: bool,
    pub skills: bool,
    pub languages: bool,
    pub experience: bool,
    pub education: bool,
    pub projects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReadiness {
    pub ready: bool,
    pub missing_milestones: Vec<Milestone>,
    pub invalid_fields: Vec<FieldError>,
}

/// Everything the editor shows about progress, recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completion_percentage: u8,
    pub steps: StepStatus,
    pub export: ExportReadiness,
}

pub fn completion_percentage(doc: &ResumeDocument) -> u8 {
    let passed = Milestone::ALL.iter().filter(|m| m.is_met(doc)).count();
    ((passed as f64 / Milestone::ALL.len() as f64) * 100.0).round() as u8
}

pub fn step_status(doc: &ResumeDocument) -> StepStatus {
    StepStatus {
        basic_info: Milestone::BasicInfo.is_met(doc),
        skills: Milestone::Skills.is_met(doc),
        languages: Milestone::Languages.is_met(doc),
        experience: !doc.experience.is_empty(),
        education: !doc.education.is_empty(),
        projects: !doc.projects.is_empty(),
    }
}

/// All milestones met and no personal-info validation errors.
pub fn export_readiness(doc: &ResumeDocument) -> ExportReadiness {
    let missing_milestones: Vec<Milestone> = Milestone::ALL
        .into_iter()
        .filter(|m| !m.is_met(doc))
        .collect();
    let invalid_fields = validate_personal_info(&doc.personal_info).errors;
    ExportReadiness {
        ready: missing_milestones.is_empty() && invalid_fields.is_empty(),
        missing_milestones,
        invalid_fields,
    }
}

pub fn is_export_ready(doc: &ResumeDocument) -> bool {
    export_readiness(doc).ready
}

pub fn summarize(doc: &ResumeDocument) -> ProgressSummary {
    ProgressSummary {
        completion_percentage: completion_percentage(doc),
        steps: step_status(doc),
        export: export_readiness(doc),
    }
}
