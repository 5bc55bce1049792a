use serde::{Deserialize, Serialize};

use featstore_core::CompositeKey;

/// One stored object: its key, annotation, feature values and identity hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub key: CompositeKey,
    /// Class index in `1..=n_classes`
    pub annotation: i64,
    /// Feature values in the store's feature-name order
    pub features: Vec<f32>,
    pub hash: f64,
}

impl FeatureRow {
    /// Build a row, deriving the hash from the key
    #[must_use]
    pub fn new(key: CompositeKey, annotation: i64, features: Vec<f32>) -> Self {
        let hash = key.normalized_hash();
        Self {
            key,
            annotation,
            features,
            hash,
        }
    }

    #[inline]
    pub fn is_removal(&self) -> bool {
        self.annotation == featstore_core::REMOVE_ANNOTATION
    }
}
