use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{ResumeDocument, ResumeType};
use crate::storage::{StorageBackend, StorageError};

/// Every key the manager owns starts with this prefix; usage and `clear_all` only
/// look at these keys.
const KEY_PREFIX: &str = "cv_autosave";
const AUTOSAVE_KEY: &str = "cv_autosave_autosave";
const DRAFT_KEY_PREFIX: &str = "cv_autosave_draft_";

pub const DEFAULT_MAX_DRAFTS: usize = 10;
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

fn draft_key(id: Uuid) -> String {
    format!("{DRAFT_KEY_PREFIX}{}", id.simple())
}

/// Records written by older builds, or edited by hand, are skipped rather than
/// failing every listing and save.
fn parse_draft(key: &str, raw: &str) -> Option<StoredDraft> {
    match serde_json::from_str(raw) {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(key, %error, "Skipping unreadable draft record");
            None
        }
    }
}

/// What is actually written under a key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDraft {
    id: Uuid,
    timestamp: DateTime<Utc>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    data: ResumeDocument,
}

/// Listing view of a named draft, without the document body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub resume_type: ResumeType,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageUsage {
    pub used: u64,
    pub total: u64,
    pub fraction: f64,
}

/// Autosave slot plus a bounded set of named drafts on top of a `StorageBackend`.
#[derive(Clone)]
pub struct DraftManager {
    backend: Arc<dyn StorageBackend>,
    max_drafts: usize,
    quota_bytes: u64,
}

impl DraftManager {
    pub fn new(backend: Arc<dyn StorageBackend>, max_drafts: usize, quota_bytes: u64) -> Self {
        Self {
            backend,
            max_drafts: max_drafts.max(1),
            quota_bytes,
        }
    }

    /// Overwrites the single autosave slot.
    pub async fn auto_save(&self, doc: &ResumeDocument) -> Result<(), StorageError> {
        let record = StoredDraft {
            id: Uuid::nil(),
            timestamp: Utc::now(),
            name: "Autosave".to_string(),
            description: None,
            data: doc.clone(),
        };
        let value = serde_json::to_string(&record)?;
        self.write_within_quota(AUTOSAVE_KEY, &value, &[]).await?;
        debug!("Autosaved document ({} bytes)", value.len());
        Ok(())
    }

    pub async fn load_latest_autosave(&self) -> Result<Option<ResumeDocument>, StorageError> {
        match self.backend.get(AUTOSAVE_KEY).await? {
            Some(raw) => {
                let record: StoredDraft = serde_json::from_str(&raw)?;
                Ok(Some(record.data))
            }
            None => Ok(None),
        }
    }

    pub async fn clear_autosave(&self) -> Result<(), StorageError> {
        self.backend.remove(AUTOSAVE_KEY).await?;
        Ok(())
    }

    /// Stores a named snapshot and returns its id. When the draft limit is reached
    /// the oldest drafts are evicted until the new one fits.
    pub async fn save_draft(
        &self,
        doc: &ResumeDocument,
        name: &str,
        description: Option<&str>,
    ) -> Result<Uuid, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }

        let record = StoredDraft {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            data: doc.clone(),
        };
        let value = serde_json::to_string(&record)?;

        let mut existing = self.load_all_drafts().await?;
        existing.sort_by_key(|(_, d)| d.timestamp);
        let excess = (existing.len() + 1).saturating_sub(self.max_drafts);
        let evicted: Vec<String> = existing
            .into_iter()
            .take(excess)
            .map(|(key, _)| key)
            .collect();

        let key = draft_key(record.id);
        let freed: Vec<&str> = evicted.iter().map(String::as_str).collect();
        self.write_within_quota(&key, &value, &freed).await?;

        for old in &evicted {
            self.backend.remove(old).await?;
            info!("Draft limit of {} reached, evicted {old}", self.max_drafts);
        }
        info!("Saved draft '{}' ({})", record.name, record.id);
        Ok(record.id)
    }

    /// Named drafts, newest first.
    pub async fn list_drafts(&self) -> Result<Vec<DraftSummary>, StorageError> {
        let mut drafts = Vec::new();
        for key in self.draft_keys().await? {
            let Some(raw) = self.backend.get(&key).await? else {
                continue;
            };
            if let Some(record) = parse_draft(&key, &raw) {
                drafts.push(DraftSummary {
                    id: record.id,
                    timestamp: record.timestamp,
                    name: record.name,
                    description: record.description,
                    resume_type: record.data.resume_type,
                    size_bytes: raw.len() as u64,
                });
            }
        }
        drafts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(drafts)
    }

    pub async fn load_draft(&self, id: Uuid) -> Result<ResumeDocument, StorageError> {
        let raw = self
            .backend
            .get(&draft_key(id))
            .await?
            .ok_or(StorageError::DraftNotFound(id))?;
        let record: StoredDraft = serde_json::from_str(&raw)?;
        Ok(record.data)
    }

    pub async fn delete_draft(&self, id: Uuid) -> Result<bool, StorageError> {
        self.backend.remove(&draft_key(id)).await
    }

    /// Removes the autosave slot and every named draft.
    pub async fn clear_all(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for key in self.owned_keys().await? {
            if self.backend.remove(&key).await? {
                removed += 1;
            }
        }
        info!("Cleared {removed} stored drafts");
        Ok(removed)
    }

    pub async fn storage_usage(&self) -> Result<StorageUsage, StorageError> {
        let used = self.used_bytes(&[]).await?;
        let fraction = if self.quota_bytes == 0 {
            1.0
        } else {
            used as f64 / self.quota_bytes as f64
        };
        Ok(StorageUsage {
            used,
            total: self.quota_bytes,
            fraction,
        })
    }

    // ────────────────────────────────────────────────────────────────────────

    async fn owned_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .backend
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(KEY_PREFIX))
            .collect())
    }

    async fn draft_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .owned_keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(DRAFT_KEY_PREFIX))
            .collect())
    }

    /// Readable named drafts with their keys.
    async fn load_all_drafts(&self) -> Result<Vec<(String, StoredDraft)>, StorageError> {
        let mut drafts = Vec::new();
        for key in self.draft_keys().await? {
            if let Some(raw) = self.backend.get(&key).await? {
                if let Some(record) = parse_draft(&key, &raw) {
                    drafts.push((key, record));
                }
            }
        }
        Ok(drafts)
    }

    /// Bytes held by owned keys, not counting `excluded`. Unreadable draft records
    /// are not counted.
    async fn used_bytes(&self, excluded: &[&str]) -> Result<u64, StorageError> {
        let mut used = 0u64;
        for key in self.owned_keys().await? {
            if excluded.contains(&key.as_str()) {
                continue;
            }
            let Some(value) = self.backend.get(&key).await? else {
                continue;
            };
            if key.starts_with(DRAFT_KEY_PREFIX)
                && serde_json::from_str::<StoredDraft>(&value).is_err()
            {
                continue;
            }
            used += value.len() as u64;
        }
        Ok(used)
    }

    /// Writes `value` under `key` unless the result would exceed the quota.
    /// `freed` lists keys about to be removed alongside this write.
    async fn write_within_quota(
        &self,
        key: &str,
        value: &str,
        freed: &[&str],
    ) -> Result<(), StorageError> {
        let mut excluded = freed.to_vec();
        excluded.push(key);
        let needed = self.used_bytes(&excluded).await? + value.len() as u64;
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }
        self.backend.set(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mutators::{add_skill, update_personal_info};
    use crate::models::PersonalField;
    use crate::storage::MemoryStorage;

    fn manager(max_drafts: usize, quota: u64) -> DraftManager {
        DraftManager::new(Arc::new(MemoryStorage::new()), max_drafts, quota)
    }

    fn named(name: &str) -> ResumeDocument {
        update_personal_info(
            &ResumeDocument::new(ResumeType::CASCADE),
            PersonalField::Name,
            name,
        )
    }

    #[tokio::test]
    async fn test_autosave_slot_round_trip() {
        let drafts = manager(DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES);
        assert!(drafts.load_latest_autosave().await.unwrap().is_none());

        let doc = add_skill(&named("Kim"), "Rust").unwrap();
        drafts.auto_save(&doc).await.unwrap();
        drafts.auto_save(&doc).await.unwrap();
        assert_eq!(drafts.load_latest_autosave().await.unwrap(), Some(doc));

        drafts.clear_autosave().await.unwrap();
        assert!(drafts.load_latest_autosave().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_named_draft() {
        let drafts = manager(DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES);
        let doc = named("Lee");
        let id = drafts
            .save_draft(&doc, "  Backend roles ", Some("v1"))
            .await
            .unwrap();

        let listed = drafts.list_drafts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Backend roles");
        assert_eq!(listed[0].description.as_deref(), Some("v1"));
        assert_eq!(drafts.load_draft(id).await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_empty_draft_name_rejected() {
        let drafts = manager(DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES);
        let err = drafts
            .save_draft(&named("Kim"), "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptyName));
    }

    #[tokio::test]
    async fn test_oldest_draft_evicted_at_limit() {
        let drafts = manager(3, DEFAULT_QUOTA_BYTES);
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(
                drafts
                    .save_draft(&named("Kim"), &format!("draft {i}"), None)
                    .await
                    .unwrap(),
            );
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let listed = drafts.list_drafts().await.unwrap();
        let names: Vec<_> = listed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["draft 3", "draft 2", "draft 1"]);
        assert!(matches!(
            drafts.load_draft(ids[0]).await,
            Err(StorageError::DraftNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lowered_limit_evicts_down_to_it() {
        let backend = Arc::new(MemoryStorage::new());
        let generous = DraftManager::new(backend.clone(), 5, DEFAULT_QUOTA_BYTES);
        for i in 0..5 {
            generous
                .save_draft(&named("Kim"), &format!("draft {i}"), None)
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let strict = DraftManager::new(backend, 2, DEFAULT_QUOTA_BYTES);
        strict.save_draft(&named("Kim"), "draft 5", None).await.unwrap();
        let listed = strict.list_drafts().await.unwrap();
        let names: Vec<_> = listed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["draft 5", "draft 4"]);
    }

    #[tokio::test]
    async fn test_unreadable_record_is_skipped() {
        let backend = Arc::new(MemoryStorage::new());
        backend
            .set("cv_autosave_draft_legacy", r#"{"old":1}"#)
            .await
            .unwrap();
        let drafts = DraftManager::new(backend.clone(), 1, DEFAULT_QUOTA_BYTES);

        assert!(drafts.list_drafts().await.unwrap().is_empty());
        assert_eq!(drafts.storage_usage().await.unwrap().used, 0);

        // A limit of one evicts only readable drafts.
        drafts.save_draft(&named("Kim"), "first", None).await.unwrap();
        drafts.save_draft(&named("Kim"), "second", None).await.unwrap();
        let listed = drafts.list_drafts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "second");
        assert!(backend.get("cv_autosave_draft_legacy").await.unwrap().is_some());

        // `clear_all` still removes it.
        assert_eq!(drafts.clear_all().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let drafts = manager(DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES);
        let id = drafts.save_draft(&named("Kim"), "a", None).await.unwrap();
        drafts.save_draft(&named("Kim"), "b", None).await.unwrap();
        drafts.auto_save(&named("Kim")).await.unwrap();

        assert!(drafts.delete_draft(id).await.unwrap());
        assert!(!drafts.delete_draft(id).await.unwrap());
        assert_eq!(drafts.clear_all().await.unwrap(), 2);
        assert!(drafts.list_drafts().await.unwrap().is_empty());
        assert!(drafts.load_latest_autosave().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_usage_counts_only_owned_keys() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set("unrelated", "xxxxxxxxxx").await.unwrap();
        let drafts = DraftManager::new(backend, DEFAULT_MAX_DRAFTS, 1000);

        assert_eq!(drafts.storage_usage().await.unwrap().used, 0);
        drafts.auto_save(&named("Kim")).await.unwrap();
        let usage = drafts.storage_usage().await.unwrap();
        assert!(usage.used > 0);
        assert_eq!(usage.total, 1000);
        assert!((usage.fraction - usage.used as f64 / 1000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_quota_exceeded_leaves_storage_untouched() {
        let drafts = manager(DEFAULT_MAX_DRAFTS, 64);
        let err = drafts.auto_save(&named("Kim")).await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 64, .. }));
        assert!(drafts.load_latest_autosave().await.unwrap().is_none());
    }
}
