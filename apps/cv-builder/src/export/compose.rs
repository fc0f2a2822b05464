//! Builds the format-neutral view every exporter renders from.
//!
//! Sections come out in template order. Hidden sections, the contact block (rendered
//! as the header instead) and sections with nothing to show are left out, so the
//! writers never have to re-check visibility.

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::sorting::{conferences_by_date, grants_by_amount, publications_by_year};
use crate::models::entries::{format_date, ConferenceKind, EducationStatus, SchoolType};
use crate::models::ResumeDocument;
use crate::templates::{section_order, SectionId, TemplateError};

pub const DEFAULT_ACCENT: &str = "#3b82f6";

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResume {
    pub name: String,
    pub job_title: String,
    pub contact: Vec<(&'static str, String)>,
    /// `#rrggbb`
    pub accent: String,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub id: SectionId,
    pub title: &'static str,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Text(String),
    Items(Vec<RenderedItem>),
    /// Short labels shown inline (skills, languages, interests).
    Tags(Vec<String>),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedItem {
    pub title: String,
    pub subtitle: String,
    pub dates: String,
    pub description: String,
    pub bullets: Vec<String>,
    pub details: Vec<(&'static str, String)>,
}

impl RenderedItem {
    fn detail(mut self, label: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.details.push((label, value));
        }
        self
    }
}

/// Header color normalized to `#rrggbb`; missing or malformed values use the default.
pub fn accent_color(doc: &ResumeDocument) -> String {
    let color = doc
        .header_color
        .as_deref()
        .map(str::trim)
        .filter(|c| HEX_COLOR.is_match(c))
        .unwrap_or(DEFAULT_ACCENT);
    if color.len() == 4 {
        let expanded: String = color[1..].chars().flat_map(|c| [c, c]).collect();
        format!("#{}", expanded.to_ascii_lowercase())
    } else {
        color.to_ascii_lowercase()
    }
}

fn joined(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn school_type_label(school_type: SchoolType) -> &'static str {
    match school_type {
        SchoolType::Elementary => "Elementary School",
        SchoolType::Middle => "Middle School",
        SchoolType::High => "High School",
        SchoolType::College => "College",
        SchoolType::University => "University",
        SchoolType::Graduate => "Graduate School",
    }
}

fn education_status_label(status: EducationStatus) -> &'static str {
    match status {
        EducationStatus::Graduated => "Graduated",
        EducationStatus::Enrolled => "Enrolled",
        EducationStatus::Dropped => "Withdrawn",
        EducationStatus::Transferred => "Transferred",
        EducationStatus::Completed => "Completed",
        EducationStatus::Suspended => "On Leave",
        EducationStatus::Attending => "Attending",
    }
}

fn conference_kind_label(kind: ConferenceKind) -> &'static str {
    match kind {
        ConferenceKind::Oral => "Oral",
        ConferenceKind::Poster => "Poster",
        ConferenceKind::Workshop => "Workshop",
    }
}

fn section_body(doc: &ResumeDocument, section: SectionId) -> Option<SectionBody> {
    let body = match section {
        SectionId::Contact => return None,
        SectionId::Summary => {
            let summary = doc.personal_info.summary.trim();
            if summary.is_empty() {
                return None;
            }
            SectionBody::Text(summary.to_string())
        }
        SectionId::AcademicBackground => SectionBody::Items(
            doc.academic_background
                .iter()
                .map(|e| RenderedItem {
                    title: e.details.school.clone(),
                    subtitle: school_type_label(e.details.school_type).to_string(),
                    dates: e.details.period.display(),
                    ..Default::default()
                })
                .collect(),
        ),
        SectionId::Experience => SectionBody::Items(
            doc.experience
                .iter()
                .map(|e| {
                    let d = &e.details;
                    RenderedItem {
                        title: joined(&[d.position.as_str(), d.company.as_str()], " at "),
                        dates: d.period.display(),
                        description: d.description.trim().to_string(),
                        bullets: non_blank(&d.achievements),
                        ..Default::default()
                    }
                    .detail("Technologies", non_blank(&d.technologies).join(", "))
                    .detail("Impact", d.impact.clone().unwrap_or_default())
                })
                .collect(),
        ),
        SectionId::Education => SectionBody::Items(
            doc.education
                .iter()
                .map(|e| {
                    let d = &e.details;
                    RenderedItem {
                        title: joined(&[d.degree.as_str(), d.field.as_str()], " in "),
                        subtitle: joined(&[d.school.as_str(), education_status_label(d.status)], ", "),
                        dates: d.period.display(),
                        ..Default::default()
                    }
                    .detail("GPA", d.gpa.clone())
                    .detail("Relevant Courses", non_blank(&d.relevant_courses).join(", "))
                    .detail("Thesis", d.thesis.clone().unwrap_or_default())
                    .detail("Advisor", d.advisor.clone().unwrap_or_default())
                })
                .collect(),
        ),
        SectionId::ExternalEducation => SectionBody::Items(
            doc.external_education
                .iter()
                .map(|e| RenderedItem {
                    title: e.details.course.clone(),
                    subtitle: e.details.institution.clone(),
                    dates: e.details.period.display(),
                    description: e.details.description.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
        ),
        SectionId::Projects => SectionBody::Items(
            doc.projects
                .iter()
                .map(|e| {
                    let d = &e.details;
                    RenderedItem {
                        title: d.name.clone(),
                        dates: d.period.display(),
                        description: d.description.trim().to_string(),
                        ..Default::default()
                    }
                    .detail("Technologies", non_blank(&d.technologies).join(", "))
                    .detail(
                        "Team Size",
                        d.team_size.map(|n| n.to_string()).unwrap_or_default(),
                    )
                    .detail("Impact", d.impact.clone().unwrap_or_default())
                    .detail("GitHub", d.github_url.clone())
                    .detail("Live Demo", d.live_url.clone())
                })
                .collect(),
        ),
        SectionId::Skills => SectionBody::Tags(
            doc.skills
                .iter()
                .map(|s| s.name.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        SectionId::SkillCategories => SectionBody::Items(
            doc.skill_categories
                .iter()
                .map(|e| RenderedItem {
                    title: e.details.name.clone(),
                    description: non_blank(&e.details.skills).join(", "),
                    bullets: non_blank(&e.details.examples),
                    ..Default::default()
                })
                .collect(),
        ),
        SectionId::Languages => SectionBody::Tags(
            doc.languages
                .iter()
                .filter(|l| !l.name.trim().is_empty())
                .map(|l| match doc.language_proficiency(&l.id) {
                    Some(level) => format!("{} ({})", l.name.trim(), level.label()),
                    None => l.name.trim().to_string(),
                })
                .collect(),
        ),
        SectionId::Publications => SectionBody::Items(
            publications_by_year(&doc.publications)
                .into_iter()
                .map(|e| {
                    let d = &e.details;
                    let authors = non_blank(&d.authors).join(", ");
                    RenderedItem {
                        title: d.title.clone(),
                        subtitle: joined(&[authors.as_str(), d.journal.as_str()], ". "),
                        dates: d.year.clone(),
                        ..Default::default()
                    }
                    .detail("DOI", d.doi.clone().unwrap_or_default())
                    .detail("Impact", d.impact.clone().unwrap_or_default())
                })
                .collect(),
        ),
        SectionId::Conferences => SectionBody::Items(
            conferences_by_date(&doc.conferences)
                .into_iter()
                .map(|e| {
                    let d = &e.details;
                    RenderedItem {
                        title: d.title.clone(),
                        subtitle: joined(&[d.conference.as_str(), d.location.as_str()], ", "),
                        dates: format_date(&d.date),
                        ..Default::default()
                    }
                    .detail("Presentation", conference_kind_label(d.kind))
                })
                .collect(),
        ),
        SectionId::Grants => SectionBody::Items(
            grants_by_amount(&doc.grants)
                .into_iter()
                .map(|e| {
                    let d = &e.details;
                    RenderedItem {
                        title: d.title.clone(),
                        subtitle: d.funding_agency.clone(),
                        dates: d.period.clone(),
                        ..Default::default()
                    }
                    .detail("Amount", d.amount.clone())
                    .detail("Role", d.role.clone())
                })
                .collect(),
        ),
        SectionId::Teaching => SectionBody::Items(
            doc.teaching
                .iter()
                .map(|e| {
                    let d = &e.details;
                    let students = if d.students > 0 {
                        d.students.to_string()
                    } else {
                        String::new()
                    };
                    RenderedItem {
                        title: d.course.clone(),
                        subtitle: d.institution.clone(),
                        dates: d.period.clone(),
                        ..Default::default()
                    }
                    .detail("Students", students)
                    .detail("Rating", d.rating.clone().unwrap_or_default())
                })
                .collect(),
        ),
        SectionId::Awards => SectionBody::Items(
            doc.awards
                .iter()
                .map(|e| RenderedItem {
                    title: e.details.title.clone(),
                    subtitle: e.details.organization.clone(),
                    dates: e.details.year.clone(),
                    description: e.details.description.trim().to_string(),
                    ..Default::default()
                })
                .collect(),
        ),
        SectionId::ResearchInterests => SectionBody::Tags(non_blank(&doc.research_interests)),
        SectionId::References => SectionBody::List(non_blank(&doc.references)),
    };

    let empty = match &body {
        SectionBody::Text(text) => text.is_empty(),
        SectionBody::Items(items) => items.is_empty(),
        SectionBody::Tags(tags) | SectionBody::List(tags) => tags.is_empty(),
    };
    (!empty).then_some(body)
}

/// Header plus the visible, non-empty sections of `doc` in template order.
pub fn compose(doc: &ResumeDocument) -> Result<RenderedResume, TemplateError> {
    let order = section_order(&doc.resume_type)?;
    let info = &doc.personal_info;

    let contact = [
        ("Email", &info.email),
        ("Phone", &info.phone),
        ("Location", &info.location),
        ("LinkedIn", &info.linkedin),
        ("GitHub", &info.github),
        ("Website", &info.website),
        ("Portfolio", &info.portfolio),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| (label, value.trim().to_string()))
    .collect();

    let sections = order
        .iter()
        .filter_map(|&id| {
            section_body(doc, id).map(|body| RenderedSection {
                id,
                title: id.title(),
                body,
            })
        })
        .collect();

    Ok(RenderedResume {
        name: info.name.trim().to_string(),
        job_title: info.job_title.trim().to_string(),
        contact,
        accent: accent_color(doc),
        sections,
    })
}
