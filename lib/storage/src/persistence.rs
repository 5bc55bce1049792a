use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use featstore_classifier::FeatureStore;

use crate::snapshot;

/// A feature store snapshot on disk.
///
/// Saves replace the whole file atomically, so a reader never observes a
/// partially written snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize `store` and atomically replace the file
    pub fn save(&self, store: &FeatureStore) -> Result<()> {
        let data = snapshot::save(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {:?}", parent))?;
        }

        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .with_context(|| format!("writing snapshot {:?}", self.path))?;

        info!(path = ?self.path, rows = store.len(), bytes = data.len(), "Saved feature store");
        Ok(())
    }

    /// Read and rebuild the store saved at this path
    pub fn load(&self) -> Result<FeatureStore> {
        let data = std::fs::read(&self.path)
            .with_context(|| format!("reading snapshot {:?}", self.path))?;
        let store = snapshot::load(&data)
            .with_context(|| format!("loading snapshot {:?}", self.path))?;
        info!(path = ?self.path, rows = store.len(), "Loaded feature store");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featstore_core::Frame;

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new(&["f1"], &["a", "b"]).unwrap();
        let frame = Frame::new()
            .with_column("roi_id", ["A"])
            .unwrap()
            .with_column("label", [1u64])
            .unwrap()
            .with_column("annotations", [2i64])
            .unwrap()
            .with_column("f1", [0.5])
            .unwrap();
        store.add_features(&frame).unwrap();
        store
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested").join("store.fst"));
        assert!(!file.exists());

        file.save(&store()).unwrap();
        assert!(file.exists());

        let loaded = file.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get_class_names(), ["a", "b"]);
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("store.fst"));
        file.save(&store()).unwrap();
        file.save(&FeatureStore::new(&["f1"], &["a", "b"]).unwrap()).unwrap();
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.fst");
        std::fs::write(&path, b"not a snapshot").unwrap();
        assert!(SnapshotFile::new(&path).load().is_err());
    }
}
