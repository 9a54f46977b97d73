// src/registration/draft.rs
//! Draft persistence for in-progress registrations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::models::RegistrationForm;
use crate::common::{ClientError, ClientResult};

/// Storage key for the multi-step registration draft
pub const REGISTER_DRAFT_KEY: &str = "multistep-register-form-draft";

/// Persisted draft envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub form: RegistrationForm,
    /// Absent in drafts written before the step was persisted
    #[serde(default)]
    pub current_step: Option<u8>,
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn new(form: RegistrationForm, current_step: u8) -> Self {
        Self {
            form,
            current_step: Some(current_step),
            saved_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, key: &str) -> ClientResult<Option<DraftSnapshot>>;
    async fn save(&self, key: &str, draft: &DraftSnapshot) -> ClientResult<()>;
    async fn clear(&self, key: &str) -> ClientResult<()>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn load(&self, key: &str) -> ClientResult<Option<DraftSnapshot>> {
        let path = self.path(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<DraftSnapshot>(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                // Unreadable drafts count as absent
                warn!(path = %path.display(), error = %e, "Discarding unreadable draft");
                Ok(None)
            }
        }
    }

    async fn save(&self, key: &str, draft: &DraftSnapshot) -> ClientResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(draft)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        // Write to a temp file, then rename into place
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Draft saved");
        Ok(())
    }

    async fn clear(&self, key: &str) -> ClientResult<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    drafts: Arc<RwLock<HashMap<String, DraftSnapshot>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, key: &str) -> ClientResult<Option<DraftSnapshot>> {
        Ok(self.drafts.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, draft: &DraftSnapshot) -> ClientResult<()> {
        self.drafts
            .write()
            .await
            .insert(key.to_string(), draft.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> ClientResult<()> {
        self.drafts.write().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// Debounced autosave
// ============================================================================

/// Saves the latest scheduled snapshot once edits go quiet
///
/// Each `schedule` replaces the pending save. Store writes and removals are
/// serialized, and a save only runs if nothing replaced or cancelled it while
/// it waited, so a cleared draft cannot be written back by a late save.
pub struct DraftAutosaver<S: DraftStore + 'static> {
    store: Arc<S>,
    key: String,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    io: Arc<AsyncMutex<()>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: DraftStore + 'static> DraftAutosaver<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>, debounce: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            io: Arc::new(AsyncMutex::new(())),
            pending: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn schedule(&self, draft: DraftSnapshot) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.take();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(key = %self.key, "No async runtime available, draft not saved");
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let current = Arc::clone(&self.generation);
        let io = Arc::clone(&self.io);
        let key = self.key.clone();
        let delay = self.debounce;
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _guard = io.lock().await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(key = %key, "Superseded draft save skipped");
                return;
            }
            if let Err(e) = store.save(&key, &draft).await {
                warn!(key = %key, error = %e, "Draft autosave failed");
            }
        }));
    }

    /// Drops the pending save; a save already writing is left to finish
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub async fn load(&self) -> ClientResult<Option<DraftSnapshot>> {
        self.store.load(&self.key).await
    }

    /// Cancels any pending save and writes `draft` right away
    pub async fn save_now(&self, draft: &DraftSnapshot) -> ClientResult<()> {
        self.cancel();
        let _guard = self.io.lock().await;
        self.store.save(&self.key, draft).await
    }

    /// Cancels any pending save and removes the stored draft
    ///
    /// Waits for a save that is already writing before removing the file.
    pub async fn clear(&self) -> ClientResult<()> {
        self.cancel();
        let _guard = self.io.lock().await;
        self.store.clear(&self.key).await?;
        info!(key = %self.key, "Draft cleared");
        Ok(())
    }
}

impl<S: DraftStore + 'static> Drop for DraftAutosaver<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
