use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ResumeType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unknown resume template '{0}'")]
    Unknown(String),
}

/// A renderable section of a résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Contact,
    Summary,
    AcademicBackground,
    Experience,
    Education,
    ExternalEducation,
    Projects,
    Skills,
    SkillCategories,
    Languages,
    Publications,
    Conferences,
    Grants,
    Teaching,
    Awards,
    ResearchInterests,
    References,
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Contact => "contact",
            SectionId::Summary => "summary",
            SectionId::AcademicBackground => "academic_background",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::ExternalEducation => "external_education",
            SectionId::Projects => "projects",
            SectionId::Skills => "skills",
            SectionId::SkillCategories => "skill_categories",
            SectionId::Languages => "languages",
            SectionId::Publications => "publications",
            SectionId::Conferences => "conferences",
            SectionId::Grants => "grants",
            SectionId::Teaching => "teaching",
            SectionId::Awards => "awards",
            SectionId::ResearchInterests => "research_interests",
            SectionId::References => "references",
        }
    }

    /// Heading used by the exporters.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::Contact => "Contact",
            SectionId::Summary => "Summary",
            SectionId::AcademicBackground => "Academic Background",
            SectionId::Experience => "Professional Experience",
            SectionId::Education => "Education",
            SectionId::ExternalEducation => "External Education",
            SectionId::Projects => "Projects",
            SectionId::Skills => "Skills",
            SectionId::SkillCategories => "Core Competencies",
            SectionId::Languages => "Languages",
            SectionId::Publications => "Publications",
            SectionId::Conferences => "Conference Presentations",
            SectionId::Grants => "Grants & Funding",
            SectionId::Teaching => "Teaching Experience",
            SectionId::Awards => "Awards & Honors",
            SectionId::ResearchInterests => "Research Interests",
            SectionId::References => "References",
        }
    }

    /// Sections every template treats as core; the rest are optional extras.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            SectionId::Contact | SectionId::Summary | SectionId::Experience | SectionId::Education
        )
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sections: &'static [SectionId],
    pub ats_compatible: bool,
    pub creative: bool,
    pub recommended_for: &'static [&'static str],
}

use SectionId::*;

static TEMPLATES: [TemplateDescriptor; 5] = [
    TemplateDescriptor {
        id: "chronological",
        name: "Chronological Resume",
        description: "Standard career-focused resume, most recent experience first.",
        sections: &[Contact, Summary, Experience, Education, Skills, Languages, Projects],
        ats_compatible: true,
        creative: false,
        recommended_for: &["Experienced professionals", "Career changers", "General applications"],
    },
    TemplateDescriptor {
        id: "functional",
        name: "Functional Resume",
        description: "Skill-focused resume that groups abilities ahead of work history.",
        sections: &[Contact, Summary, SkillCategories, Projects, Experience, Education, Languages],
        ats_compatible: false,
        creative: false,
        recommended_for: &["Career changers", "Employment gaps", "New graduates"],
    },
    TemplateDescriptor {
        id: "combination",
        name: "Combination Resume",
        description: "Competencies up front, followed by a full chronological history.",
        sections: &[
            Contact,
            Summary,
            SkillCategories,
            Experience,
            Education,
            Projects,
            Skills,
            Languages,
        ],
        ats_compatible: true,
        creative: false,
        recommended_for: &["Senior professionals", "Specialists", "Technical roles"],
    },
    TemplateDescriptor {
        id: "academic",
        name: "Academic CV",
        description: "Research and teaching record for academic positions.",
        sections: &[
            Contact,
            Summary,
            Education,
            AcademicBackground,
            Publications,
            Conferences,
            Grants,
            Teaching,
            Awards,
            ResearchInterests,
            References,
            Languages,
        ],
        ats_compatible: true,
        creative: false,
        recommended_for: &["Researchers", "Faculty applicants", "Graduate school applicants"],
    },
    TemplateDescriptor {
        id: "cascade",
        name: "Cascade Type Resume",
        description: "Modern layout balancing a sidebar with the main content.",
        sections: &[
            Contact,
            Summary,
            Education,
            ExternalEducation,
            Experience,
            Projects,
            Languages,
            Skills,
        ],
        ats_compatible: true,
        creative: true,
        recommended_for: &[
            "Experienced professionals",
            "Specialists",
            "Modern design",
            "Information-rich applications",
        ],
    },
];

pub fn get_template(resume_type: &ResumeType) -> Result<&'static TemplateDescriptor, TemplateError> {
    TEMPLATES
        .iter()
        .find(|t| t.id == resume_type.as_str())
        .ok_or_else(|| TemplateError::Unknown(resume_type.to_string()))
}

pub fn all_templates() -> &'static [TemplateDescriptor] {
    &TEMPLATES
}

pub fn section_order(resume_type: &ResumeType) -> Result<&'static [SectionId], TemplateError> {
    Ok(get_template(resume_type)?.sections)
}

pub fn is_section_visible(
    resume_type: &ResumeType,
    section: SectionId,
) -> Result<bool, TemplateError> {
    Ok(section_order(resume_type)?.contains(&section))
}

pub fn required_sections(resume_type: &ResumeType) -> Result<Vec<SectionId>, TemplateError> {
    Ok(section_order(resume_type)?
        .iter()
        .copied()
        .filter(SectionId::is_core)
        .collect())
}

pub fn optional_sections(resume_type: &ResumeType) -> Result<Vec<SectionId>, TemplateError> {
    Ok(section_order(resume_type)?
        .iter()
        .copied()
        .filter(|s| !s.is_core())
        .collect())
}
