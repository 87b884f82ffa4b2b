//! Shared Model Handle

use crate::artifact_store::ArtifactStore;
use crate::StorageError;
use inference_engine::ModelArtifact;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info};

/// How long a failed load is remembered before the file is read again
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Slot {
    artifact: Option<Arc<ModelArtifact>>,
    last_miss: Option<Instant>,
}

/// Lazily loaded artifact shared by all request handlers
///
/// Only a successful load is cached. After a failed load (missing or
/// unreadable file) callers get `None` from the read lock alone until the
/// retry interval has passed. Disk reads run on the blocking pool and never
/// under the slot's write lock.
pub struct ModelCache {
    store: ArtifactStore,
    slot: RwLock<Slot>,
    loading: Mutex<()>,
    retry_interval: Duration,
}

impl ModelCache {
    /// Create an empty cache for the artifact at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: ArtifactStore::new(path),
            slot: RwLock::new(Slot::default()),
            loading: Mutex::new(()),
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Current artifact, loading it on first use
    pub async fn get(&self) -> Option<Arc<ModelArtifact>> {
        if let Some(answer) = self.cached().await {
            return answer;
        }

        let _loading = self.loading.lock().await;
        // another request may have loaded it while we waited
        if let Some(answer) = self.cached().await {
            return answer;
        }
        self.load_into_slot().await
    }

    /// Drop the cached artifact and read the file again
    pub async fn reload(&self) -> Option<Arc<ModelArtifact>> {
        let _loading = self.loading.lock().await;
        self.load_into_slot().await
    }

    /// `Some(answer)` when the slot can answer without reading the file
    async fn cached(&self) -> Option<Option<Arc<ModelArtifact>>> {
        let slot = self.slot.read().await;
        if let Some(artifact) = &slot.artifact {
            return Some(Some(Arc::clone(artifact)));
        }
        match slot.last_miss {
            Some(at) if at.elapsed() < self.retry_interval => Some(None),
            _ => None,
        }
    }

    async fn load_into_slot(&self) -> Option<Arc<ModelArtifact>> {
        let loaded = self.read_artifact().await;

        let mut slot = self.slot.write().await;
        slot.last_miss = match loaded {
            Some(_) => None,
            None => Some(Instant::now()),
        };
        slot.artifact = loaded.clone();
        loaded
    }

    async fn read_artifact(&self) -> Option<Arc<ModelArtifact>> {
        let store = self.store.clone();
        let result = match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(result) => result,
            Err(err) => {
                error!("Model load task failed: {}", err);
                return None;
            }
        };

        match result {
            Ok(artifact) => {
                info!(
                    "Model loaded from {} (backend: {})",
                    self.path().display(),
                    artifact.backend
                );
                Some(Arc::new(artifact))
            }
            Err(StorageError::NotFound(path)) => {
                debug!("No model at {}, serving fallback scores", path.display());
                None
            }
            Err(err) => {
                error!("Failed to load model from {}: {}", self.path().display(), err);
                None
            }
        }
    }
}
