//! The live editing session: the current document, its revision counter and the
//! per-collection edit focus used by the form UI.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::dispatch_collection;
use crate::document::mutators::{self, EditError};
use crate::models::{Collection, CollectionItem, Entry, EntryId, ResumeDocument, ResumeType};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("No entry is being edited in {0}")]
    NoActiveEdit(Collection),

    #[error("Failed to snapshot entry: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Focus on one entry of a collection while its form is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditSession {
    pub index: usize,
    /// True when the entry was created by `begin_new_entry`; cancelling deletes it.
    pub is_new: bool,
    /// The entry as it was when editing began. Absent for new entries.
    #[serde(skip)]
    snapshot: Option<Value>,
}

pub struct Workspace {
    document: ResumeDocument,
    revision: u64,
    saved_revision: u64,
    sessions: BTreeMap<Collection, EditSession>,
}

impl Workspace {
    pub fn new(document: ResumeDocument) -> Self {
        Self {
            document,
            revision: 0,
            saved_revision: 0,
            sessions: BTreeMap::new(),
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the document changed since the last `mark_saved`.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision;
    }

    pub fn sessions(&self) -> &BTreeMap<Collection, EditSession> {
        &self.sessions
    }

    pub fn editing(&self, collection: Collection) -> Option<&EditSession> {
        self.sessions.get(&collection)
    }

    /// Applies a mutator. On success the result replaces the document, gets a fresh
    /// `last_modified` and a new revision; on failure nothing changes.
    pub fn commit<F, E>(&mut self, edit: F) -> Result<&ResumeDocument, E>
    where
        F: FnOnce(&ResumeDocument) -> Result<ResumeDocument, E>,
    {
        let mut next = edit(&self.document)?;
        next.last_modified = Utc::now();
        self.document = next;
        self.revision += 1;
        Ok(&self.document)
    }

    /// `commit` for mutators that cannot fail.
    pub fn apply<F>(&mut self, edit: F) -> &ResumeDocument
    where
        F: FnOnce(&ResumeDocument) -> ResumeDocument,
    {
        let mut next = edit(&self.document);
        next.last_modified = Utc::now();
        self.document = next;
        self.revision += 1;
        &self.document
    }

    /// Replaces the document wholesale (import, draft load). Open edits are dropped.
    pub fn load(&mut self, document: ResumeDocument) {
        self.document = document;
        self.sessions.clear();
        self.revision += 1;
    }

    pub fn reset(&mut self, resume_type: ResumeType) {
        self.load(mutators::reset_document(resume_type));
    }

    // ────────────────────────────────────────────────────────────────────────
    // Index-shifting edits that keep edit focus consistent
    // ────────────────────────────────────────────────────────────────────────

    pub fn delete_entry(&mut self, collection: Collection, index: usize) -> Result<(), EditError> {
        dispatch_collection!(collection, D => {
            self.commit(|doc| mutators::delete_entry::<D>(doc, index))?;
        });
        self.focus_after_delete(collection, index);
        Ok(())
    }

    pub fn delete_entry_by_id(
        &mut self,
        collection: Collection,
        id: &EntryId,
    ) -> Result<(), EditError> {
        dispatch_collection!(collection, D => {
            let index = mutators::require_position::<D>(&self.document, id)?;
            self.commit(|doc| mutators::delete_entry_by_id::<D>(doc, id))?;
            self.focus_after_delete(collection, index);
        });
        Ok(())
    }

    fn focus_after_delete(&mut self, collection: Collection, index: usize) {
        if let Some(session) = self.sessions.get_mut(&collection) {
            if session.index == index {
                self.sessions.remove(&collection);
            } else if session.index > index {
                session.index -= 1;
            }
        }
    }

    pub fn reorder_entry(
        &mut self,
        collection: Collection,
        from: usize,
        to: usize,
    ) -> Result<(), EditError> {
        dispatch_collection!(collection, D => {
            self.commit(|doc| mutators::reorder_entry::<D>(doc, from, to))?;
        });
        if let Some(session) = self.sessions.get_mut(&collection) {
            session.index = shifted_index(session.index, from, to);
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Edit sessions
    // ────────────────────────────────────────────────────────────────────────

    /// Opens the entry at `index` for editing and remembers its current value.
    /// Replaces any earlier focus in the same collection.
    pub fn begin_edit(&mut self, collection: Collection, index: usize) -> Result<(), WorkspaceError> {
        let snapshot = dispatch_collection!(collection, D => snapshot_entry::<D>(&self.document, index))?;
        self.sessions.insert(
            collection,
            EditSession {
                index,
                is_new: false,
                snapshot: Some(snapshot),
            },
        );
        Ok(())
    }

    /// Appends a blank (or prefilled) entry and opens it for editing.
    pub fn begin_new_entry<D: CollectionItem>(&mut self, entry: Entry<D>) -> usize {
        let index = D::entries(&self.document).len();
        self.apply(|doc| mutators::add_entry(doc, entry));
        self.sessions.insert(
            D::COLLECTION,
            EditSession {
                index,
                is_new: true,
                snapshot: None,
            },
        );
        index
    }

    /// Keeps the entry as edited and closes the form.
    pub fn confirm_edit(&mut self, collection: Collection) -> Result<EditSession, WorkspaceError> {
        self.sessions
            .remove(&collection)
            .ok_or(WorkspaceError::NoActiveEdit(collection))
    }

    /// Restores the entry to its value at `begin_edit`, or removes it if it was new.
    pub fn cancel_edit(&mut self, collection: Collection) -> Result<(), WorkspaceError> {
        let session = self
            .sessions
            .remove(&collection)
            .ok_or(WorkspaceError::NoActiveEdit(collection))?;
        match session.snapshot {
            None => {
                dispatch_collection!(collection, D => {
                    self.commit(|doc| mutators::delete_entry::<D>(doc, session.index))?;
                });
            }
            Some(snapshot) => {
                dispatch_collection!(collection, D => {
                    let entry: Entry<D> = serde_json::from_value(snapshot)?;
                    self.commit(|doc| mutators::update_entry(doc, session.index, entry))?;
                });
            }
        }
        Ok(())
    }
}

fn snapshot_entry<D: CollectionItem>(
    doc: &ResumeDocument,
    index: usize,
) -> Result<Value, WorkspaceError> {
    let entries = D::entries(doc);
    let entry = entries.get(index).ok_or(EditError::IndexOutOfBounds {
        collection: D::COLLECTION.as_str(),
        index,
        len: entries.len(),
    })?;
    Ok(serde_json::to_value(entry)?)
}

/// Where the item at `index` ends up after moving `from` to `to`.
fn shifted_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entries::{Experience, Project};
    use pretty_assertions::assert_eq;

    fn experience(company: &str) -> Entry<Experience> {
        Entry::new(Experience {
            company: company.into(),
            ..Default::default()
        })
    }

    fn workspace_with(companies: &[&str]) -> Workspace {
        let mut ws = Workspace::new(ResumeDocument::new(ResumeType::CHRONOLOGICAL));
        for c in companies {
            ws.apply(|d| mutators::add_entry(d, experience(c)));
        }
        ws
    }

    fn companies(ws: &Workspace) -> Vec<String> {
        ws.document()
            .experience
            .iter()
            .map(|e| e.details.company.clone())
            .collect()
    }

    #[test]
    fn test_commit_bumps_revision_and_stamps_time() {
        let mut ws = Workspace::new(ResumeDocument::new(ResumeType::CASCADE));
        let before = ws.document().last_modified;
        ws.commit(|d| mutators::add_skill(d, "Rust")).unwrap();
        assert_eq!(ws.revision(), 1);
        assert!(ws.document().last_modified >= before);
        assert!(ws.is_dirty());
        ws.mark_saved(1);
        assert!(!ws.is_dirty());
    }

    #[test]
    fn test_failed_commit_leaves_document() {
        let mut ws = workspace_with(&["A"]);
        let before = ws.document().clone();
        let err = ws
            .commit(|d| mutators::delete_entry::<Experience>(d, 5))
            .unwrap_err();
        assert!(matches!(err, EditError::IndexOutOfBounds { .. }));
        assert_eq!(ws.document(), &before);
        assert_eq!(ws.revision(), 1);
    }

    #[test]
    fn test_cancel_edit_restores_snapshot() {
        let mut ws = workspace_with(&["Acme"]);
        let original = ws.document().experience[0].clone();
        ws.begin_edit(Collection::Experience, 0).unwrap();

        let mut edited = original.clone();
        edited.details.company = "Globex".into();
        ws.commit(|d| mutators::update_entry(d, 0, edited)).unwrap();
        assert_eq!(companies(&ws), vec!["Globex"]);

        ws.cancel_edit(Collection::Experience).unwrap();
        assert_eq!(ws.document().experience[0], original);
        assert!(ws.editing(Collection::Experience).is_none());
    }

    #[test]
    fn test_cancel_new_entry_deletes_it() {
        let mut ws = workspace_with(&["Acme"]);
        let index = ws.begin_new_entry(experience(""));
        assert_eq!(index, 1);
        assert!(ws.editing(Collection::Experience).unwrap().is_new);
        ws.cancel_edit(Collection::Experience).unwrap();
        assert_eq!(companies(&ws), vec!["Acme"]);
    }

    #[test]
    fn test_confirm_keeps_edit() {
        let mut ws = Workspace::new(ResumeDocument::new(ResumeType::CASCADE));
        ws.begin_new_entry(Entry::new(Project {
            name: "cv-builder".into(),
            ..Default::default()
        }));
        ws.confirm_edit(Collection::Projects).unwrap();
        assert_eq!(ws.document().projects.len(), 1);
        assert!(matches!(
            ws.confirm_edit(Collection::Projects),
            Err(WorkspaceError::NoActiveEdit(Collection::Projects))
        ));
    }

    #[test]
    fn test_begin_edit_out_of_bounds() {
        let mut ws = workspace_with(&[]);
        assert!(matches!(
            ws.begin_edit(Collection::Experience, 0),
            Err(WorkspaceError::Edit(EditError::IndexOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_delete_earlier_entry_shifts_focus() {
        let mut ws = workspace_with(&["A", "B", "C"]);
        ws.begin_edit(Collection::Experience, 2).unwrap();
        ws.delete_entry(Collection::Experience, 0).unwrap();
        assert_eq!(ws.editing(Collection::Experience).unwrap().index, 1);
        ws.cancel_edit(Collection::Experience).unwrap();
        assert_eq!(companies(&ws), vec!["B", "C"]);
    }

    #[test]
    fn test_delete_focused_entry_clears_focus() {
        let mut ws = workspace_with(&["A", "B"]);
        ws.begin_edit(Collection::Experience, 1).unwrap();
        ws.delete_entry(Collection::Experience, 1).unwrap();
        assert!(ws.editing(Collection::Experience).is_none());
    }

    #[test]
    fn test_delete_by_id_shifts_focus() {
        let mut ws = workspace_with(&["A", "B", "C"]);
        let id = ws.document().experience[0].id;
        ws.begin_edit(Collection::Experience, 1).unwrap();
        ws.delete_entry_by_id(Collection::Experience, &id).unwrap();
        assert_eq!(companies(&ws), vec!["B", "C"]);
        assert_eq!(ws.editing(Collection::Experience).unwrap().index, 0);
        assert!(matches!(
            ws.delete_entry_by_id(Collection::Experience, &id),
            Err(EditError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn test_reorder_follows_focus() {
        let mut ws = workspace_with(&["A", "B", "C", "D"]);
        ws.begin_edit(Collection::Experience, 1).unwrap();
        ws.reorder_entry(Collection::Experience, 0, 3).unwrap();
        assert_eq!(companies(&ws), vec!["B", "C", "D", "A"]);
        assert_eq!(ws.editing(Collection::Experience).unwrap().index, 0);
    }

    #[test]
    fn test_shifted_index() {
        assert_eq!(shifted_index(2, 2, 0), 0);
        assert_eq!(shifted_index(1, 0, 3), 0);
        assert_eq!(shifted_index(1, 3, 0), 2);
        assert_eq!(shifted_index(3, 0, 1), 3);
    }

    #[test]
    fn test_reset_clears_sessions() {
        let mut ws = workspace_with(&["A"]);
        ws.begin_edit(Collection::Experience, 0).unwrap();
        ws.reset(ResumeType::ACADEMIC);
        assert!(ws.sessions().is_empty());
        assert_eq!(ws.document().resume_type, ResumeType::ACADEMIC);
        assert!(ws.document().experience.is_empty());
    }
}
