//! Model artifacts on disk, one file per bearing

use crate::StorageError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stores encoded models as `model_b{n}.bin`
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, bearing: usize) -> PathBuf {
        self.dir.join(format!("model_b{}.bin", bearing))
    }

    pub fn exists(&self, bearing: usize) -> bool {
        self.path_for(bearing).is_file()
    }

    /// Write a model, replacing the previous one atomically
    pub fn save(&self, bearing: usize, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let path = self.path_for(bearing);
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, bytes).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))?;

        info!("Saved model for bearing {} ({} bytes) to {}", bearing, bytes.len(), path.display());
        Ok(path)
    }

    /// Read the model for a bearing
    pub fn load(&self, bearing: usize) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(bearing);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Loaded model for bearing {} from {}", bearing, path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(format!(
                "no model for bearing {} at {}",
                bearing,
                path.display()
            ))),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"));

        assert!(!store.exists(1));
        let path = store.save(1, &[1, 2, 3]).unwrap();
        assert!(path.ends_with("model_b1.bin"));
        assert!(store.exists(1));
        assert_eq!(store.load(1).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_save_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        store.save(2, &[9; 16]).unwrap();
        store.save(2, &[7]).unwrap();

        assert_eq!(store.load(2).unwrap(), vec![7]);
        assert!(!dir.path().join("model_b2.bin.tmp").exists());
    }

    #[test]
    fn test_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(matches!(store.load(3), Err(StorageError::NotFound(_))));
    }
}
