//! Document mutators: every edit the builder can make to a résumé.
//!
//! Each function takes the current document by reference and returns the next one.
//! Nothing here touches `last_modified`; the workspace stamps it when it commits,
//! which keeps `add` followed by `delete` an exact round-trip.

use thiserror::Error;

use crate::models::entries::{SkillCategory, CollectionItem, Entry, EntryId};
use crate::models::{
    Language, PersonalField, ProficiencyLevel, ResumeDocument, ResumeType, Skill, SkillScore,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Index {index} is out of bounds for {collection} (length {len})")]
    IndexOutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("No entry with id {id} in {collection}")]
    EntryNotFound { collection: &'static str, id: EntryId },

    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    #[error("Unknown skill id {0}")]
    UnknownSkill(EntryId),

    #[error("Unknown language id {0}")]
    UnknownLanguage(EntryId),
}

fn check_index(collection: &'static str, index: usize, len: usize) -> Result<(), EditError> {
    if index < len {
        Ok(())
    } else {
        Err(EditError::IndexOutOfBounds {
            collection,
            index,
            len,
        })
    }
}

/// Standard array move: take the item at `from`, reinsert it at `to`.
fn move_item<T>(
    items: &mut Vec<T>,
    collection: &'static str,
    from: usize,
    to: usize,
) -> Result<(), EditError> {
    check_index(collection, from, items.len())?;
    check_index(collection, to, items.len())?;
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

fn non_empty(value: &str, what: &'static str) -> Result<String, EditError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EditError::EmptyValue(what))
    } else {
        Ok(trimmed.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generic entry collections
// ────────────────────────────────────────────────────────────────────────────

/// Appends `entry` to its collection. The caller assigns the id (`Entry::new`).
pub fn add_entry<D: CollectionItem>(doc: &ResumeDocument, entry: Entry<D>) -> ResumeDocument {
    let mut next = doc.clone();
    D::entries_mut(&mut next).push(entry);
    next
}

/// Replaces the entry at `index` wholesale.
pub fn update_entry<D: CollectionItem>(
    doc: &ResumeDocument,
    index: usize,
    entry: Entry<D>,
) -> Result<ResumeDocument, EditError> {
    check_index(D::COLLECTION.as_str(), index, D::entries(doc).len())?;
    let mut next = doc.clone();
    D::entries_mut(&mut next)[index] = entry;
    Ok(next)
}

/// Removes the entry at `index`; later entries shift down by one.
pub fn delete_entry<D: CollectionItem>(
    doc: &ResumeDocument,
    index: usize,
) -> Result<ResumeDocument, EditError> {
    check_index(D::COLLECTION.as_str(), index, D::entries(doc).len())?;
    let mut next = doc.clone();
    D::entries_mut(&mut next).remove(index);
    Ok(next)
}

pub fn reorder_entry<D: CollectionItem>(
    doc: &ResumeDocument,
    from: usize,
    to: usize,
) -> Result<ResumeDocument, EditError> {
    let mut next = doc.clone();
    move_item(D::entries_mut(&mut next), D::COLLECTION.as_str(), from, to)?;
    Ok(next)
}

pub fn position_of<D: CollectionItem>(doc: &ResumeDocument, id: &EntryId) -> Option<usize> {
    D::entries(doc).iter().position(|e| &e.id == id)
}

/// Index of the entry with `id`, or `EntryNotFound`.
pub fn require_position<D: CollectionItem>(
    doc: &ResumeDocument,
    id: &EntryId,
) -> Result<usize, EditError> {
    position_of::<D>(doc, id).ok_or(EditError::EntryNotFound {
        collection: D::COLLECTION.as_str(),
        id: *id,
    })
}

/// Replaces the details of the entry with `id`, keeping its id and position.
pub fn update_entry_by_id<D: CollectionItem>(
    doc: &ResumeDocument,
    id: &EntryId,
    details: D,
) -> Result<ResumeDocument, EditError> {
    let index = require_position::<D>(doc, id)?;
    update_entry(doc, index, Entry { id: *id, details })
}

pub fn delete_entry_by_id<D: CollectionItem>(
    doc: &ResumeDocument,
    id: &EntryId,
) -> Result<ResumeDocument, EditError> {
    let index = require_position::<D>(doc, id)?;
    delete_entry::<D>(doc, index)
}

pub fn add_skill_to_category(
    doc: &ResumeDocument,
    category_id: &EntryId,
    skill: &str,
) -> Result<ResumeDocument, EditError> {
    let skill = non_empty(skill, "skill")?;
    let index = require_position::<SkillCategory>(doc, category_id)?;
    let mut next = doc.clone();
    next.skill_categories[index].details.skills.push(skill);
    Ok(next)
}

pub fn remove_skill_from_category(
    doc: &ResumeDocument,
    category_id: &EntryId,
    skill_index: usize,
) -> Result<ResumeDocument, EditError> {
    let index = require_position::<SkillCategory>(doc, category_id)?;
    let mut next = doc.clone();
    let skills = &mut next.skill_categories[index].details.skills;
    check_index("skill_categories.skills", skill_index, skills.len())?;
    skills.remove(skill_index);
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// Adds a trimmed skill with the default rating of 3.
pub fn add_skill(doc: &ResumeDocument, name: &str) -> Result<ResumeDocument, EditError> {
    let name = non_empty(name, "skill")?;
    let mut next = doc.clone();
    let skill = Skill {
        id: EntryId::new(),
        name,
    };
    next.skill_scores.insert(skill.id, SkillScore::DEFAULT);
    next.skills.push(skill);
    Ok(next)
}

/// Removes the skill at `index` together with its rating.
pub fn remove_skill(doc: &ResumeDocument, index: usize) -> Result<ResumeDocument, EditError> {
    check_index("skills", index, doc.skills.len())?;
    let mut next = doc.clone();
    let removed = next.skills.remove(index);
    next.skill_scores.remove(&removed.id);
    Ok(next)
}

pub fn rename_skill(
    doc: &ResumeDocument,
    index: usize,
    name: &str,
) -> Result<ResumeDocument, EditError> {
    check_index("skills", index, doc.skills.len())?;
    let name = non_empty(name, "skill")?;
    let mut next = doc.clone();
    next.skills[index].name = name;
    Ok(next)
}

pub fn reorder_skills(
    doc: &ResumeDocument,
    from: usize,
    to: usize,
) -> Result<ResumeDocument, EditError> {
    let mut next = doc.clone();
    move_item(&mut next.skills, "skills", from, to)?;
    Ok(next)
}

/// Clamps `score` into 1..=5 and upserts the rating for `skill`.
pub fn set_skill_score(
    doc: &ResumeDocument,
    skill: &EntryId,
    score: i64,
) -> Result<ResumeDocument, EditError> {
    if !doc.skills.iter().any(|s| &s.id == skill) {
        return Err(EditError::UnknownSkill(*skill));
    }
    let mut next = doc.clone();
    next.skill_scores.insert(*skill, SkillScore::clamped(score));
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Languages
// ────────────────────────────────────────────────────────────────────────────

/// Adds a trimmed language. No proficiency is recorded until one is set.
pub fn add_language(doc: &ResumeDocument, name: &str) -> Result<ResumeDocument, EditError> {
    let name = non_empty(name, "language")?;
    let mut next = doc.clone();
    next.languages.push(Language {
        id: EntryId::new(),
        name,
    });
    Ok(next)
}

pub fn remove_language(doc: &ResumeDocument, index: usize) -> Result<ResumeDocument, EditError> {
    check_index("languages", index, doc.languages.len())?;
    let mut next = doc.clone();
    let removed = next.languages.remove(index);
    next.language_proficiencies.remove(&removed.id);
    Ok(next)
}

pub fn rename_language(
    doc: &ResumeDocument,
    index: usize,
    name: &str,
) -> Result<ResumeDocument, EditError> {
    check_index("languages", index, doc.languages.len())?;
    let name = non_empty(name, "language")?;
    let mut next = doc.clone();
    next.languages[index].name = name;
    Ok(next)
}

pub fn reorder_languages(
    doc: &ResumeDocument,
    from: usize,
    to: usize,
) -> Result<ResumeDocument, EditError> {
    let mut next = doc.clone();
    move_item(&mut next.languages, "languages", from, to)?;
    Ok(next)
}

pub fn set_language_proficiency(
    doc: &ResumeDocument,
    language: &EntryId,
    level: ProficiencyLevel,
) -> Result<ResumeDocument, EditError> {
    if !doc.languages.iter().any(|l| &l.id == language) {
        return Err(EditError::UnknownLanguage(*language));
    }
    let mut next = doc.clone();
    next.language_proficiencies.insert(*language, level);
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Document-level fields
// ────────────────────────────────────────────────────────────────────────────

pub fn update_personal_info(
    doc: &ResumeDocument,
    field: PersonalField,
    value: impl Into<String>,
) -> ResumeDocument {
    let mut next = doc.clone();
    *next.personal_info.field_mut(field) = value.into();
    next
}

/// Changes the template type only. Collections the new template hides are kept.
pub fn set_document_type(doc: &ResumeDocument, resume_type: ResumeType) -> ResumeDocument {
    let mut next = doc.clone();
    next.resume_type = resume_type;
    next
}

/// Sets the header accent color; a blank value clears it.
pub fn set_header_color(doc: &ResumeDocument, color: Option<&str>) -> ResumeDocument {
    let mut next = doc.clone();
    next.header_color = color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    next
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn set_research_interests(doc: &ResumeDocument, interests: Vec<String>) -> ResumeDocument {
    let mut next = doc.clone();
    next.research_interests = clean_list(interests);
    next
}

pub fn set_references(doc: &ResumeDocument, references: Vec<String>) -> ResumeDocument {
    let mut next = doc.clone();
    next.references = clean_list(references);
    next
}

pub fn reset_document(resume_type: ResumeType) -> ResumeDocument {
    ResumeDocument::new(resume_type)
}
