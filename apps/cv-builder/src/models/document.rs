use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::entries::{
    AcademicBackground, Award, Conference, Education, Entry, EntryId, Experience,
    ExternalEducation, Grant, Project, Publication, SkillCategory, Teaching,
};

/// Schema version written into every new document.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Résumé template identifier.
///
/// Deliberately an open set: documents saved by a build that knew more template
/// types still load, and the registry reports the unknown id when asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeType(Cow<'static, str>);

impl ResumeType {
    pub const CHRONOLOGICAL: ResumeType = ResumeType(Cow::Borrowed("chronological"));
    pub const FUNCTIONAL: ResumeType = ResumeType(Cow::Borrowed("functional"));
    pub const COMBINATION: ResumeType = ResumeType(Cow::Borrowed("combination"));
    pub const ACADEMIC: ResumeType = ResumeType(Cow::Borrowed("academic"));
    pub const CASCADE: ResumeType = ResumeType(Cow::Borrowed("cascade"));

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub summary: String,
    pub job_title: String,
    pub website: String,
    pub portfolio: String,
    /// Profile photo as a data URL or remote URL.
    pub profile_photo: String,
}

/// Addressable fields of `PersonalInfo`, used by the single-field update mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    Name,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Summary,
    JobTitle,
    Website,
    Portfolio,
    ProfilePhoto,
}

impl PersonalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalField::Name => "name",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::Location => "location",
            PersonalField::Linkedin => "linkedin",
            PersonalField::Github => "github",
            PersonalField::Summary => "summary",
            PersonalField::JobTitle => "job_title",
            PersonalField::Website => "website",
            PersonalField::Portfolio => "portfolio",
            PersonalField::ProfilePhoto => "profile_photo",
        }
    }
}

impl PersonalInfo {
    pub fn get(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::Name => &self.name,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::Location => &self.location,
            PersonalField::Linkedin => &self.linkedin,
            PersonalField::Github => &self.github,
            PersonalField::Summary => &self.summary,
            PersonalField::JobTitle => &self.job_title,
            PersonalField::Website => &self.website,
            PersonalField::Portfolio => &self.portfolio,
            PersonalField::ProfilePhoto => &self.profile_photo,
        }
    }

    pub fn field_mut(&mut self, field: PersonalField) -> &mut String {
        match field {
            PersonalField::Name => &mut self.name,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::Location => &mut self.location,
            PersonalField::Linkedin => &mut self.linkedin,
            PersonalField::Github => &mut self.github,
            PersonalField::Summary => &mut self.summary,
            PersonalField::JobTitle => &mut self.job_title,
            PersonalField::Website => &mut self.website,
            PersonalField::Portfolio => &mut self.portfolio,
            PersonalField::ProfilePhoto => &mut self.profile_photo,
        }
    }
}

/// Self-assessed skill rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct SkillScore(u8);

impl SkillScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: SkillScore = SkillScore(3);

    /// Clamps any integer into the valid rating range.
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for SkillScore {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<SkillScore> for u8 {
    fn from(score: SkillScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Native,
    Fluent,
    Business,
    Intermediate,
    Basic,
}

impl ProficiencyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyLevel::Native => "Native",
            ProficiencyLevel::Fluent => "Fluent",
            ProficiencyLevel::Business => "Business",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Basic => "Basic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: EntryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: EntryId,
    pub name: String,
}

/// One résumé. Created empty, changed only through `document::mutators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(rename = "type")]
    pub resume_type: ResumeType,
    #[serde(default)]
    pub personal_info: PersonalInfo,

    #[serde(default)]
    pub academic_background: Vec<Entry<AcademicBackground>>,
    #[serde(default)]
    pub experience: Vec<Entry<Experience>>,
    #[serde(default)]
    pub education: Vec<Entry<Education>>,
    #[serde(default)]
    pub external_education: Vec<Entry<ExternalEducation>>,
    #[serde(default)]
    pub projects: Vec<Entry<Project>>,

    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Ratings keyed by skill id, so renaming a skill keeps its rating.
    #[serde(default)]
    pub skill_scores: BTreeMap<EntryId, SkillScore>,
    #[serde(default)]
    pub skill_categories: Vec<Entry<SkillCategory>>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub language_proficiencies: BTreeMap<EntryId, ProficiencyLevel>,

    #[serde(default)]
    pub publications: Vec<Entry<Publication>>,
    #[serde(default)]
    pub conferences: Vec<Entry<Conference>>,
    #[serde(default)]
    pub grants: Vec<Entry<Grant>>,
    #[serde(default)]
    pub teaching: Vec<Entry<Teaching>>,
    #[serde(default)]
    pub awards: Vec<Entry<Award>>,
    #[serde(default)]
    pub research_interests: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,

    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub header_color: Option<String>,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl ResumeDocument {
    /// A blank document of the given type: every collection empty, every string blank.
    pub fn new(resume_type: ResumeType) -> Self {
        Self {
            resume_type,
            personal_info: PersonalInfo::default(),
            academic_background: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            external_education: Vec::new(),
            projects: Vec::new(),
            skills: Vec::new(),
            skill_scores: BTreeMap::new(),
            skill_categories: Vec::new(),
            languages: Vec::new(),
            language_proficiencies: BTreeMap::new(),
            publications: Vec::new(),
            conferences: Vec::new(),
            grants: Vec::new(),
            teaching: Vec::new(),
            awards: Vec::new(),
            research_interests: Vec::new(),
            references: Vec::new(),
            last_modified: Utc::now(),
            version: default_version(),
            header_color: None,
        }
    }

    pub fn language_proficiency(&self, id: &EntryId) -> Option<ProficiencyLevel> {
        self.language_proficiencies.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_score_clamps() {
        assert_eq!(SkillScore::clamped(0).value(), 1);
        assert_eq!(SkillScore::clamped(9).value(), 5);
        assert_eq!(SkillScore::clamped(-40).value(), 1);
        assert_eq!(SkillScore::clamped(4).value(), 4);
    }

    #[test]
    fn test_skill_score_deserialize_clamps() {
        let s: SkillScore = serde_json::from_str("12").unwrap();
        assert_eq!(s.value(), 5);
        assert_eq!(serde_json::to_string(&SkillScore::DEFAULT).unwrap(), "3");
    }

    #[test]
    fn test_resume_type_open_set() {
        let t: ResumeType = serde_json::from_str("\"infographic\"").unwrap();
        assert_eq!(t.as_str(), "infographic");
        let known: ResumeType = serde_json::from_str("\"academic\"").unwrap();
        assert_eq!(known, ResumeType::ACADEMIC);
    }

    #[test]
    fn test_new_document_is_blank() {
        let doc = ResumeDocument::new(ResumeType::CASCADE);
        assert_eq!(doc.personal_info, PersonalInfo::default());
        assert!(doc.experience.is_empty() && doc.skills.is_empty() && doc.languages.is_empty());
        assert_eq!(doc.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_document_json_uses_type_key() {
        let doc = ResumeDocument::new(ResumeType::CHRONOLOGICAL);
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["type"], "chronological");
        let back: ResumeDocument = serde_json::from_value(v).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_minimal_document_json_loads() {
        let json = r#"{"type":"cascade","last_modified":"2024-05-01T00:00:00Z"}"#;
        let doc: ResumeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.resume_type, ResumeType::CASCADE);
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn test_missing_last_modified_defaults_to_now() {
        let before = Utc::now();
        let doc: ResumeDocument = serde_json::from_str(r#"{"type":"academic"}"#).unwrap();
        assert!(doc.last_modified >= before);
        assert_eq!(doc.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_personal_field_accessors_agree() {
        let mut info = PersonalInfo::default();
        *info.field_mut(PersonalField::JobTitle) = "Engineer".into();
        assert_eq!(info.get(PersonalField::JobTitle), "Engineer");
        assert_eq!(info.job_title, "Engineer");
    }
}
