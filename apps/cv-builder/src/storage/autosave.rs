use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::storage::{DraftManager, StorageError};
use crate::workspace::Workspace;

/// Writes the current document to the autosave slot if it changed since the last
/// save. Returns whether anything was written.
pub async fn save_if_dirty(
    workspace: &RwLock<Workspace>,
    drafts: &DraftManager,
) -> Result<bool, StorageError> {
    let (doc, revision) = {
        let ws = workspace.read().await;
        if !ws.is_dirty() {
            return Ok(false);
        }
        (ws.document().clone(), ws.revision())
    };
    drafts.auto_save(&doc).await?;
    workspace.write().await.mark_saved(revision);
    Ok(true)
}

/// Handle to the periodic autosave task.
pub struct AutosaveTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl AutosaveTask {
    pub fn spawn(workspace: Arc<RwLock<Workspace>>, drafts: DraftManager, period: Duration) -> Self {
        let (stop, mut stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match save_if_dirty(&workspace, &drafts).await {
                            Ok(true) => debug!("Autosave tick wrote document"),
                            Ok(false) => {}
                            Err(e) => error!("Autosave failed: {e}"),
                        }
                    }
                    _ = &mut stop_rx => break,
                }
            }

            match save_if_dirty(&workspace, &drafts).await {
                Ok(true) => info!("Flushed unsaved changes on shutdown"),
                Ok(false) => {}
                Err(e) => error!("Final autosave failed: {e}"),
            }
        });
        info!("Autosave every {}s", period.as_secs());
        Self { stop, handle }
    }

    /// Stops the ticker and waits for the final flush.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            error!("Autosave task ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::mutators::add_skill;
    use crate::models::{ResumeDocument, ResumeType};
    use crate::storage::drafts::{DEFAULT_MAX_DRAFTS, DEFAULT_QUOTA_BYTES};
    use crate::storage::MemoryStorage;

    fn setup() -> (Arc<RwLock<Workspace>>, DraftManager) {
        let ws = Workspace::new(ResumeDocument::new(ResumeType::CASCADE));
        let drafts = DraftManager::new(
            Arc::new(MemoryStorage::new()),
            DEFAULT_MAX_DRAFTS,
            DEFAULT_QUOTA_BYTES,
        );
        (Arc::new(RwLock::new(ws)), drafts)
    }

    #[tokio::test]
    async fn test_save_if_dirty_only_writes_changes() {
        let (ws, drafts) = setup();
        assert!(!save_if_dirty(&ws, &drafts).await.unwrap());

        ws.write().await.commit(|d| add_skill(d, "Rust")).unwrap();
        assert!(save_if_dirty(&ws, &drafts).await.unwrap());
        assert!(!save_if_dirty(&ws, &drafts).await.unwrap());
        assert!(!ws.read().await.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_saves_on_tick() {
        let (ws, drafts) = setup();
        let task = AutosaveTask::spawn(ws.clone(), drafts.clone(), Duration::from_secs(30));

        ws.write().await.commit(|d| add_skill(d, "Rust")).unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;

        let saved = drafts.load_latest_autosave().await.unwrap().unwrap();
        assert_eq!(saved.skills[0].name, "Rust");
        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_changes() {
        let (ws, drafts) = setup();
        let task = AutosaveTask::spawn(ws.clone(), drafts.clone(), Duration::from_secs(30));

        ws.write().await.commit(|d| add_skill(d, "Go")).unwrap();
        task.shutdown().await;

        let saved = drafts.load_latest_autosave().await.unwrap().unwrap();
        assert_eq!(saved.skills[0].name, "Go");
    }
}
