//! Artifact Persistence

use crate::StorageError;
use inference_engine::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads and writes a single artifact file
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    /// Create a new artifact store
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the artifact, creating parent directories as needed
    pub fn save(&self, artifact: &ModelArtifact) -> Result<(), StorageError> {
        artifact.validate()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = postcard::to_allocvec(artifact)?;
        fs::write(&self.path, &bytes)?;
        info!(
            "Saved {} artifact {} ({} bytes) to {}",
            artifact.backend,
            artifact.model_id,
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read and validate the artifact
    pub fn load(&self) -> Result<ModelArtifact, StorageError> {
        if !self.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        let artifact: ModelArtifact = postcard::from_bytes(&bytes)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: artifact.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        artifact.validate()?;
        debug!(
            "Loaded {} artifact {} with features {:?}",
            artifact.backend, artifact.model_id, artifact.features
        );
        Ok(artifact)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use inference_engine::{LogisticModel, LogisticParams, ModelMetrics, TrainedModel};
    use ndarray::Array2;

    pub(crate) fn artifact() -> ModelArtifact {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![10.0, 0.0, 20.0, 10.0, 30.0, 20.0, 50.0, 150.0, 60.0, 200.0, 70.0, 250.0],
        )
        .unwrap();
        let y = [false, false, false, true, true, true];
        let model = LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap();
        ModelArtifact::new(
            TrainedModel::LogisticRegression(model),
            vec!["torque".into(), "tool_wear".into()],
            Some(ModelMetrics {
                roc_auc: 1.0,
                pr_auc: 1.0,
                f1: 1.0,
                expected_cost: 0.0,
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models/nested/model.bin"));
        let original = artifact();

        store.save(&original).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), original);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("absent.bin"));
        assert!(matches!(store.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, b"not an artifact").unwrap();
        assert!(ArtifactStore::new(&path).load().is_err());
    }
}
