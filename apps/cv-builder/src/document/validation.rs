use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::dispatch_collection;
use crate::models::{
    Collection, CollectionItem, EntryId, PersonalField, PersonalInfo, ResumeDocument,
};

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Korean numbers: mobile (010, 011, 016-019), Seoul (02), regional (031-099).
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^(01[016789]|02|0[3-9][0-9])-?[0-9]{3,4}-?[0-9]{4}$").unwrap();

    static ref NAME_PATTERN: Regex = Regex::new(r"^[가-힣a-zA-Z\s]{2,20}$").unwrap();

    static ref LOCATION_PATTERN: Regex = Regex::new(r"^[가-힣a-zA-Z\s,]+$").unwrap();
}

/// A single failed personal-info check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: PersonalField,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Whitespace is ignored, so "010 1234 5678" passes.
pub fn validate_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_PATTERN.is_match(&compact)
}

/// Empty is allowed (the link fields are optional); anything else must parse as an absolute URL.
pub fn validate_url(url: &str) -> bool {
    url.is_empty() || Url::parse(url).is_ok()
}

pub fn validate_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name.trim())
}

pub fn validate_location(location: &str) -> bool {
    if location.is_empty() {
        return true;
    }
    let trimmed = location.trim();
    LOCATION_PATTERN.is_match(trimmed) && trimmed.chars().count() >= 2
}

fn error(field: PersonalField, message: &str) -> FieldError {
    FieldError {
        field,
        message: message.to_string(),
    }
}

/// Checks the contact block. Name, email and phone are required; location and the
/// profile links are only checked when filled in.
pub fn validate_personal_info(info: &PersonalInfo) -> ValidationReport {
    let mut errors = Vec::new();

    if info.name.trim().is_empty() {
        errors.push(error(PersonalField::Name, "Please enter your name."));
    } else if !validate_name(&info.name) {
        errors.push(error(
            PersonalField::Name,
            "Name must be 2-20 characters of Hangul, Latin letters or spaces.",
        ));
    }

    if info.email.trim().is_empty() {
        errors.push(error(PersonalField::Email, "Please enter your email."));
    } else if !validate_email(&info.email) {
        errors.push(error(
            PersonalField::Email,
            "Please enter a valid email address (e.g. example@email.com).",
        ));
    }

    if info.phone.trim().is_empty() {
        errors.push(error(PersonalField::Phone, "Please enter your phone number."));
    } else if !validate_phone(&info.phone) {
        errors.push(error(
            PersonalField::Phone,
            "Please enter a valid phone number (e.g. 010-1234-5678).",
        ));
    }

    if !validate_location(&info.location) {
        errors.push(error(
            PersonalField::Location,
            "Please enter a valid location (e.g. Seoul, Korea).",
        ));
    }

    for (field, label) in [
        (PersonalField::Linkedin, "LinkedIn"),
        (PersonalField::Github, "GitHub"),
        (PersonalField::Website, "website"),
        (PersonalField::Portfolio, "portfolio"),
    ] {
        if !validate_url(info.get(field)) {
            errors.push(FieldError {
                field,
                message: format!("Please enter a valid {label} URL."),
            });
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Inline message for a single field while it is being typed. Blank input never
/// produces a message here; required-field errors come from `validate_personal_info`.
/// Ids that occur more than once anywhere in the document: every entry collection
/// plus skills and languages. Edits address entries by id alone, so an imported
/// document must keep them unique.
pub fn duplicate_entry_ids(doc: &ResumeDocument) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = doc
        .skills
        .iter()
        .map(|s| s.id)
        .chain(doc.languages.iter().map(|l| l.id))
        .collect();
    for collection in Collection::ALL {
        dispatch_collection!(collection, D => {
            ids.extend(D::entries(doc).iter().map(|e| e.id));
        });
    }

    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            duplicates.insert(id);
        }
    }
    duplicates.into_iter().collect()
}

pub fn field_message(field: PersonalField, value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return None;
    }
    let ok = match field {
        PersonalField::Name => validate_name(value),
        PersonalField::Email => validate_email(value),
        PersonalField::Phone => validate_phone(value),
        PersonalField::Location => validate_location(value),
        PersonalField::Linkedin
        | PersonalField::Github
        | PersonalField::Website
        | PersonalField::Portfolio => validate_url(value),
        _ => true,
    };
    if ok {
        None
    } else {
        Some(match field {
            PersonalField::Name => "Use 2-20 characters of Hangul, Latin letters or spaces.",
            PersonalField::Email => "Please enter a valid email address.",
            PersonalField::Phone => "Please enter a valid phone number.",
            PersonalField::Location => "Please enter a valid location.",
            _ => "Please enter a valid URL.",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mutators::{add_entry, add_skill};
    use crate::models::entries::{Experience, Project};
    use crate::models::{Entry, ResumeType};

    fn kim() -> PersonalInfo {
        PersonalInfo {
            name: "Kim".into(),
            email: "kim@x.com".into(),
            phone: "010-1234-5678".into(),
            location: "Seoul".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_email() {
        assert!(validate_email("kim@x.com"));
        assert!(!validate_email("kim@x"));
        assert!(!validate_email("k im@x.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("010-1234-5678"));
        assert!(validate_phone("01012345678"));
        assert!(validate_phone("02-123-4567"));
        assert!(validate_phone("031-123-4567"));
        assert!(validate_phone("010 1234 5678"));
        assert!(!validate_phone("012-1234-5678"));
        assert!(!validate_phone("555-0100"));
    }

    #[test]
    fn test_url_optional() {
        assert!(validate_url(""));
        assert!(validate_url("https://github.com/kim"));
        assert!(!validate_url("github.com/kim"));
    }

    #[test]
    fn test_name_and_location() {
        assert!(validate_name("김철수"));
        assert!(validate_name("  Kim Minsu "));
        assert!(!validate_name("K"));
        assert!(!validate_name("Kim2"));
        assert!(validate_location(""));
        assert!(validate_location("서울, 한국"));
        assert!(!validate_location("Seoul 04524"));
    }

    #[test]
    fn test_valid_personal_info() {
        let report = validate_personal_info(&kim());
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[test]
    fn test_required_fields_reported() {
        let report = validate_personal_info(&PersonalInfo::default());
        let fields: Vec<_> = report.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![PersonalField::Name, PersonalField::Email, PersonalField::Phone]
        );
    }

    #[test]
    fn test_bad_link_reported() {
        let info = PersonalInfo {
            github: "not a url".into(),
            ..kim()
        };
        let report = validate_personal_info(&info);
        assert!(!report.is_valid);
        assert_eq!(report.errors[0].field, PersonalField::Github);
    }

    #[test]
    fn test_field_message_silent_on_blank() {
        assert_eq!(field_message(PersonalField::Email, "  "), None);
        assert!(field_message(PersonalField::Email, "nope").is_some());
        assert_eq!(field_message(PersonalField::Summary, "anything"), None);
    }

    #[test]
    fn test_duplicate_ids_found_across_collections() {
        let doc = add_skill(&ResumeDocument::new(ResumeType::CASCADE), "Rust").unwrap();
        let doc = add_entry(&doc, Entry::new(Experience::default()));
        assert!(duplicate_entry_ids(&doc).is_empty());

        let shared = doc.experience[0].id;
        let doc = add_entry(
            &doc,
            Entry {
                id: shared,
                details: Project::default(),
            },
        );
        let skill_id = doc.skills[0].id;
        let mut doc = add_entry(
            &doc,
            Entry {
                id: skill_id,
                details: Experience::default(),
            },
        );
        let mut expected = vec![shared, skill_id];
        expected.sort();
        assert_eq!(duplicate_entry_ids(&doc), expected);

        doc.projects.clear();
        doc.experience.pop();
        assert!(duplicate_entry_ids(&doc).is_empty());
    }
}
