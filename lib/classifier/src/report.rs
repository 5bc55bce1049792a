use serde::Serialize;
use std::fmt;

use featstore_core::Result;

/// What a single `add_features` call did to the store.
///
/// Rows dropped for a missing annotation or a missing feature value are soft
/// conditions: they are only reported here, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Rows in the supplied batch
    pub total_rows: usize,
    /// Rows dropped because the annotation was missing
    pub missing_annotation: usize,
    /// Rows dropped because a key or feature value was missing
    pub incomplete_features: usize,
    /// Keys that were new to the store
    pub added: usize,
    /// Keys whose stored row was replaced
    pub replaced: usize,
    /// Keys deleted by a removal annotation
    pub removed: usize,
}

impl MergeReport {
    /// Rows that never reached validation
    #[inline]
    pub fn dropped(&self) -> usize {
        self.missing_annotation + self.incomplete_features
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} added, {} replaced, {} removed, {} dropped \
             ({} without annotation, {} with missing values)",
            self.total_rows,
            self.added,
            self.replaced,
            self.removed,
            self.dropped(),
            self.missing_annotation,
            self.incomplete_features,
        )
    }
}

/// Result of one named batch in a multi-batch call
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub name: String,
    pub result: Result<T>,
}

impl<T> BatchOutcome<T> {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_sums_soft_conditions() {
        let report = MergeReport {
            total_rows: 5,
            missing_annotation: 1,
            incomplete_features: 2,
            added: 2,
            ..Default::default()
        };
        assert_eq!(report.dropped(), 3);
        assert!(report.to_string().contains("3 dropped"));
    }
}
