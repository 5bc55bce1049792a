use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::{hash_object_id, join_key_parts};

/// Default names of the two identity columns
pub const ROI_COLUMN: &str = "roi_id";
pub const LABEL_COLUMN: &str = "label";

/// The (region of interest, label) pair identifying one object.
///
/// Ordering is by region first, then label, which is also the row order of
/// the stored table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    pub roi_id: String,
    pub label: u64,
}

impl CompositeKey {
    #[inline]
    #[must_use]
    pub fn new(roi_id: impl Into<String>, label: u64) -> Self {
        Self {
            roi_id: roi_id.into(),
            label,
        }
    }

    /// Object id string the hash is computed from, e.g. `"A_1"`
    pub fn object_id(&self) -> String {
        join_key_parts(&[self.roi_id.as_str(), &self.label.to_string()])
    }

    /// Deterministic fraction in `[0, 1)` derived from the key only
    #[inline]
    pub fn normalized_hash(&self) -> f64 {
        hash_object_id(&self.object_id())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object_id())
    }
}

impl<S: Into<String>> From<(S, u64)> for CompositeKey {
    fn from((roi_id, label): (S, u64)) -> Self {
        CompositeKey::new(roi_id, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            CompositeKey::new("B", 1),
            CompositeKey::new("A", 10),
            CompositeKey::new("A", 2),
        ];
        keys.sort();
        assert_eq!(keys[0], CompositeKey::new("A", 2));
        assert_eq!(keys[1], CompositeKey::new("A", 10));
        assert_eq!(keys[2], CompositeKey::new("B", 1));
    }

    #[test]
    fn test_display_joins_parts() {
        assert_eq!(CompositeKey::new("roi_3", 17).to_string(), "roi_3_17");
    }

    #[test]
    fn test_hash_depends_on_key_only() {
        let a = CompositeKey::new("A", 1);
        let b: CompositeKey = ("A", 1).into();
        assert_eq!(a.normalized_hash(), b.normalized_hash());
        assert_ne!(a.normalized_hash(), CompositeKey::new("A", 2).normalized_hash());
    }
}
