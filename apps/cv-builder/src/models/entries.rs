use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::ResumeDocument;

/// Stable identifier for any entry in the document. Assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A record in one of the document's ordered collections.
///
/// The id lives on the wrapper so that every collection shares one id lifecycle;
/// `details` is flattened so the wire shape stays a single flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<D> {
    pub id: EntryId,
    #[serde(flatten)]
    pub details: D,
}

impl<D> Entry<D> {
    /// Wraps `details` with a freshly generated id.
    pub fn new(details: D) -> Self {
        Self {
            id: EntryId::new(),
            details,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Date ranges
// ────────────────────────────────────────────────────────────────────────────

/// Shared start/end record for every dated entry (experience, education, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
}

const PRESENT: &str = "Present";

impl Period {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            is_current: false,
        }
    }

    /// True when the entry is still running, either flagged or spelled as "present" in the end date.
    pub fn is_ongoing(&self) -> bool {
        self.is_current || is_present_marker(&self.end_date)
    }

    /// Renders the range as `start - end`, with ongoing ranges ending in "Present".
    pub fn display(&self) -> String {
        let start = format_date(&self.start_date);
        let end = if self.is_ongoing() {
            PRESENT.to_string()
        } else {
            format_date(&self.end_date)
        };
        match (start.is_empty(), end.is_empty()) {
            (true, true) => String::new(),
            (false, true) => start,
            (true, false) => end,
            (false, false) => format!("{start} - {end}"),
        }
    }
}

fn is_present_marker(s: &str) -> bool {
    let s = s.trim();
    s == "현재" || s.eq_ignore_ascii_case("present")
}

/// Normalizes a stored date for display.
///
/// `YYYY-MM-DD` becomes `DD/MM/YY`; present markers become "Present"; anything else
/// (e.g. `2020-01`) is returned unchanged.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return String::new();
    }
    if is_present_marker(date) {
        return PRESENT.to_string();
    }
    let parts: Vec<&str> = date.split('-').collect();
    if let [year, month, day] = parts.as_slice() {
        let is_digits = |s: &str, n: usize| s.len() == n && s.chars().all(|c| c.is_ascii_digit());
        if is_digits(year, 4) && is_digits(month, 2) && is_digits(day, 2) {
            return format!("{day}/{month}/{}", &year[2..]);
        }
    }
    date.to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Detail records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolType {
    Elementary,
    Middle,
    High,
    College,
    #[default]
    University,
    Graduate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicBackground {
    pub school: String,
    pub school_type: SchoolType,
    #[serde(flatten)]
    pub period: Period,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    #[serde(flatten)]
    pub period: Period,
    pub description: String,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
    /// Quantified outcome, e.g. "revenue +20%".
    pub impact: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationStatus {
    #[default]
    Graduated,
    Enrolled,
    Dropped,
    Transferred,
    Completed,
    Suspended,
    Attending,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field: String,
    #[serde(flatten)]
    pub period: Period,
    pub status: EducationStatus,
    pub gpa: String,
    pub relevant_courses: Vec<String>,
    pub thesis: Option<String>,
    pub advisor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalEducation {
    pub institution: String,
    pub course: String,
    #[serde(flatten)]
    pub period: Period,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: String,
    pub live_url: String,
    #[serde(flatten)]
    pub period: Period,
    pub impact: Option<String>,
    pub team_size: Option<u32>,
}

/// A named group of skills with supporting examples (functional/combination résumés).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publication {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub year: String,
    pub doi: Option<String>,
    pub impact: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConferenceKind {
    #[default]
    Oral,
    Poster,
    Workshop,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conference {
    pub title: String,
    pub conference: String,
    pub location: String,
    pub date: String,
    pub kind: ConferenceKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grant {
    pub title: String,
    pub funding_agency: String,
    pub amount: String,
    pub period: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Teaching {
    pub course: String,
    pub institution: String,
    pub period: String,
    pub students: u32,
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    pub title: String,
    pub organization: String,
    pub year: String,
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Collections
// ────────────────────────────────────────────────────────────────────────────

/// Names every ordered entry collection of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    AcademicBackground,
    Experience,
    Education,
    ExternalEducation,
    Projects,
    SkillCategories,
    Publications,
    Conferences,
    Grants,
    Teaching,
    Awards,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::AcademicBackground,
        Collection::Experience,
        Collection::Education,
        Collection::ExternalEducation,
        Collection::Projects,
        Collection::SkillCategories,
        Collection::Publications,
        Collection::Conferences,
        Collection::Grants,
        Collection::Teaching,
        Collection::Awards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::AcademicBackground => "academic_background",
            Collection::Experience => "experience",
            Collection::Education => "education",
            Collection::ExternalEducation => "external_education",
            Collection::Projects => "projects",
            Collection::SkillCategories => "skill_categories",
            Collection::Publications => "publications",
            Collection::Conferences => "conferences",
            Collection::Grants => "grants",
            Collection::Teaching => "teaching",
            Collection::Awards => "awards",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ties a detail record to the collection that stores it.
///
/// Generic mutators are written once against this trait instead of once per collection.
pub trait CollectionItem:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const COLLECTION: Collection;

    fn entries(doc: &ResumeDocument) -> &Vec<Entry<Self>>;

    fn entries_mut(doc: &mut ResumeDocument) -> &mut Vec<Entry<Self>>;
}

macro_rules! collection_item {
    ($ty:ty, $variant:ident, $field:ident) => {
        impl CollectionItem for $ty {
            const COLLECTION: Collection = Collection::$variant;

            fn entries(doc: &ResumeDocument) -> &Vec<Entry<Self>> {
                &doc.$field
            }

            fn entries_mut(doc: &mut ResumeDocument) -> &mut Vec<Entry<Self>> {
                &mut doc.$field
            }
        }
    };
}

collection_item!(AcademicBackground, AcademicBackground, academic_background);
collection_item!(Experience, Experience, experience);
collection_item!(Education, Education, education);
collection_item!(ExternalEducation, ExternalEducation, external_education);
collection_item!(Project, Projects, projects);
collection_item!(SkillCategory, SkillCategories, skill_categories);
collection_item!(Publication, Publications, publications);
collection_item!(Conference, Conferences, conferences);
collection_item!(Grant, Grants, grants);
collection_item!(Teaching, Teaching, teaching);
collection_item!(Award, Awards, awards);

/// Expands `$body` once per collection with `$ty` bound to that collection's detail type.
///
/// Used at the HTTP boundary, where the collection is only known at runtime.
#[macro_export]
macro_rules! dispatch_collection {
    ($collection:expr, $ty:ident => $body:expr) => {{
        use $crate::models::entries as __e;
        match $collection {
            __e::Collection::AcademicBackground => {
                type $ty = __e::AcademicBackground;
                $body
            }
            __e::Collection::Experience => {
                type $ty = __e::Experience;
                $body
            }
            __e::Collection::Education => {
                type $ty = __e::Education;
                $body
            }
            __e::Collection::ExternalEducation => {
                type $ty = __e::ExternalEducation;
                $body
            }
            __e::Collection::Projects => {
                type $ty = __e::Project;
                $body
            }
            __e::Collection::SkillCategories => {
                type $ty = __e::SkillCategory;
                $body
            }
            __e::Collection::Publications => {
                type $ty = __e::Publication;
                $body
            }
            __e::Collection::Conferences => {
                type $ty = __e::Conference;
                $body
            }
            __e::Collection::Grants => {
                type $ty = __e::Grant;
                $body
            }
            __e::Collection::Teaching => {
                type $ty = __e::Teaching;
                $body
            }
            __e::Collection::Awards => {
                type $ty = __e::Award;
                $body
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_full_iso() {
        assert_eq!(format_date("2023-04-09"), "09/04/23");
    }

    #[test]
    fn test_format_date_month_precision_untouched() {
        assert_eq!(format_date("2020-01"), "2020-01");
    }

    #[test]
    fn test_format_date_present_markers() {
        assert_eq!(format_date("현재"), "Present");
        assert_eq!(format_date("present"), "Present");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_period_display_ongoing_by_marker() {
        let p = Period::new("2020-01", "현재");
        assert!(p.is_ongoing());
        assert_eq!(p.display(), "2020-01 - Present");
    }

    #[test]
    fn test_period_display_ongoing_by_flag() {
        let p = Period {
            start_date: "2021-03".into(),
            end_date: String::new(),
            is_current: true,
        };
        assert_eq!(p.display(), "2021-03 - Present");
    }

    #[test]
    fn test_period_display_partial() {
        assert_eq!(Period::new("2019-09", "").display(), "2019-09");
        assert_eq!(Period::default().display(), "");
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = Entry::new(Experience {
            company: "Acme".into(),
            position: "Engineer".into(),
            period: Period::new("2020-01", "2021-01"),
            ..Default::default()
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["company"], "Acme");
        assert_eq!(value["start_date"], "2020-01");
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_entry_deserializes_with_missing_fields() {
        let json = serde_json::json!({
            "id": "5b0f8f3e-4b8c-4d4e-9a55-0c6f0a4bb7e1",
            "name": "Compiler"
        });
        let entry: Entry<Project> = serde_json::from_value(json).unwrap();
        assert_eq!(entry.details.name, "Compiler");
        assert!(entry.details.technologies.is_empty());
        assert_eq!(entry.details.period, Period::default());
    }

    #[test]
    fn test_collection_path_names_round_trip_through_serde() {
        for c in Collection::ALL {
            let v = serde_json::to_value(c).unwrap();
            assert_eq!(v, c.as_str());
        }
    }
}
