use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use featstore_core::{Frame, Result};

use crate::report::MergeReport;
use crate::Classifier;

/// Cloneable handle that serializes writers on one classifier.
///
/// Merges take the write lock; predictions and name lookups share the read
/// lock, so reads may run concurrently with each other but never with a
/// merge.
#[derive(Debug, Clone)]
pub struct SharedClassifier {
    inner: Arc<RwLock<Classifier>>,
}

impl SharedClassifier {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(classifier)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Classifier> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Classifier> {
        self.inner.write()
    }

    pub fn add_features(&self, batch: &Frame) -> Result<MergeReport> {
        self.inner.write().add_features(batch)
    }

    pub fn predict(&self, batch: &Frame) -> Result<Vec<i64>> {
        self.inner.read().predict(batch)
    }

    pub fn get_class_names(&self) -> Vec<String> {
        self.inner.read().store().get_class_names().to_vec()
    }

    pub fn get_feature_names(&self) -> Vec<String> {
        self.inner.read().store().get_feature_names().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.read().store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Classifier> for SharedClassifier {
    fn from(classifier: Classifier) -> Self {
        Self::new(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn batch(roi: &str, n: u64) -> Frame {
        Frame::new()
            .with_column("roi_id", (0..n).map(|_| roi))
            .unwrap()
            .with_column("label", 1..=n)
            .unwrap()
            .with_column("annotations", (0..n).map(|i| (i % 2 + 1) as i64))
            .unwrap()
            .with_column("f1", (0..n).map(|i| i as f64))
            .unwrap()
    }

    #[test]
    fn test_concurrent_writers_are_serialized() {
        let shared = SharedClassifier::new(Classifier::new(&["f1"], &["a", "b"]).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let roi = format!("roi_{}", t);
                    shared.add_features(&batch(&roi, 25)).unwrap();
                    shared.predict(&batch(&roi, 5)).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 5);
        }
        assert_eq!(shared.len(), 100);
        assert_eq!(shared.get_class_names(), vec!["a", "b"]);
        assert_eq!(shared.get_feature_names(), vec!["f1"]);
    }
}
