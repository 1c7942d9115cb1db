use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use anyhow::{Context, Result};
use tokio::sync::Mutex as AsyncMutex;

use crate::{
    log_info, log_warn,
    models::{generate_empty_summaries, RecordKind, TextBlock},
    settings::{NotebookSettings, SettingsStore},
};

use super::{apply_save, SummaryPersistence};

const ENABLE_LOGS: bool = true;

/// Process-wide map of record id to its saved note blocks.
///
/// Records are filled lazily on first access, from persistence when
/// something was stored before and from the section table otherwise.
/// Notebook settings are read on every save, so changes apply at once.
#[derive(Clone)]
pub struct SummaryStore {
    records: Arc<RwLock<HashMap<String, Vec<TextBlock>>>>,
    save_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
    persistence: Arc<dyn SummaryPersistence>,
    settings: Arc<SettingsStore>,
}

impl SummaryStore {
    pub fn new(persistence: Arc<dyn SummaryPersistence>, settings: Arc<SettingsStore>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            save_locks: Arc::new(Mutex::new(HashMap::new())),
            persistence,
            settings,
        }
    }

    pub fn get(&self, record_id: &str) -> Option<Vec<TextBlock>> {
        let guard = self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(record_id).cloned()
    }

    pub fn record_ids(&self) -> Vec<String> {
        let guard = self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ids: Vec<String> = guard.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the record's blocks, materialising them on first access.
    pub async fn init_summaries(&self, record_id: &str, kind: RecordKind) -> Result<Vec<TextBlock>> {
        if let Some(blocks) = self.get(record_id) {
            return Ok(blocks);
        }

        let loaded = self
            .persistence
            .load(record_id)
            .await
            .with_context(|| format!("failed to load notes for {record_id}"))?;

        let blocks = match loaded {
            Some(blocks) if !blocks.is_empty() => blocks,
            _ => {
                log_info!("Initialising empty {kind} notebook for {record_id}");
                generate_empty_summaries(record_id, kind)
            }
        };

        // A concurrent init may have won; keep whichever landed first.
        let mut guard = self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.entry(record_id.to_string()).or_insert(blocks).clone())
    }

    fn save_lock(&self, record_id: &str) -> Arc<AsyncMutex<()>> {
        let mut guard = self.save_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .entry(record_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the record's lock entry once no other save holds or waits on it.
    fn release_save_lock(&self, record_id: &str, lock: Arc<AsyncMutex<()>>) {
        let mut guard = self.save_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference lives in the map, the other is `lock`.
        if Arc::strong_count(&lock) == 2 {
            guard.remove(record_id);
        }
    }

    /// Saves a draft batch for a record and returns the stored blocks.
    ///
    /// On failure the store keeps its previous blocks, so the caller's
    /// drafts stay dirty and the same batch can be retried.
    pub async fn save(&self, record_id: &str, drafts: Vec<TextBlock>) -> Result<Vec<TextBlock>> {
        let settings = self.settings.notebook();
        if !settings.serialize_saves {
            return self.commit_batch(record_id, drafts, settings).await;
        }

        let lock = self.save_lock(record_id);
        let result = {
            let _guard = lock.lock().await;
            self.commit_batch(record_id, drafts, settings).await
        };
        self.release_save_lock(record_id, lock);
        result
    }

    async fn commit_batch(
        &self,
        record_id: &str,
        drafts: Vec<TextBlock>,
        settings: NotebookSettings,
    ) -> Result<Vec<TextBlock>> {
        let current = match self.get(record_id) {
            Some(blocks) => blocks,
            None => self
                .persistence
                .load(record_id)
                .await
                .with_context(|| format!("failed to load notes for {record_id}"))?
                .unwrap_or_default(),
        };

        let updated = if settings.track_history {
            apply_save(&current, &drafts)
        } else {
            drafts
        };

        if let Err(err) = self.persistence.persist(record_id, &updated).await {
            log_warn!("Saving notes for {record_id} failed, drafts retained: {err:#}");
            return Err(err.context(format!("failed to save notes for {record_id}")));
        }

        let changed = updated
            .iter()
            .filter(|block| current.iter().any(|old| old.id == block.id && old.content != block.content))
            .count();
        log_info!("Saved {} blocks for {record_id} ({changed} changed)", updated.len());

        let mut guard = self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(record_id.to_string(), updated.clone());
        Ok(updated)
    }

    /// Drops the cached blocks and reads them again from persistence.
    pub async fn reload(&self, record_id: &str, kind: RecordKind) -> Result<Vec<TextBlock>> {
        {
            let mut guard = self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.remove(record_id);
        }
        self.init_summaries(record_id, kind).await
    }
}
