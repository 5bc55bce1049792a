//! # featstore
//!
//! Incrementally built, schema-checked feature tables for labeling and
//! classifying segmented objects.
//!
//! Features for objects (for example the regions of a label image) arrive in
//! batches. Each object is identified by a composite key of region id and
//! label, can be re-annotated at any time, and is removed again by annotating
//! it with `-1`. The accumulated table always conforms to a strict schema.
//!
//! ## Quick Start
//!
//! ### As a Library
//!
//! ```rust
//! use featstore::prelude::*;
//!
//! let mut classifier = Classifier::new(&["f1", "f2"], &["healthy", "sick"]).unwrap();
//!
//! let batch = Frame::new()
//!     .with_column("roi_id", ["A", "A"]).unwrap()
//!     .with_column("label", [1u64, 2]).unwrap()
//!     .with_column("annotations", [Some(1i64), None]).unwrap()
//!     .with_column("f1", [0.2, 0.1]).unwrap()
//!     .with_column("f2", [0.5, 0.9]).unwrap();
//!
//! let report = classifier.add_features(&batch).unwrap();
//! assert_eq!(report.added, 1);
//!
//! let blob = featstore::storage::save(classifier.store()).unwrap();
//! let restored = featstore::storage::load(&blob).unwrap();
//! assert_eq!(restored.len(), 1);
//! ```
//!
//! ### As a Command-Line Tool
//!
//! ```bash
//! featstore init --config classifier.json --out store.fst
//! featstore add --store store.fst --batch batch.json
//! featstore predict --store store.fst --batch objects.json
//! ```
//!
//! ## Crate Structure
//!
//! - `featstore-core` - Cells, frames, composite keys, identity hashing, errors
//! - `featstore-schema` - Input and internal schemas and the generic validator
//! - `featstore-classifier` - Feature store, merge semantics, predictors
//! - `featstore-storage` - Snapshot serialization and file persistence

// Re-export core types
pub use featstore_core::{
    hash_object_id, join_key_parts, random_object_id, Column, CompositeKey, Error, Frame, Result,
    Value, ANNOTATION_COLUMN, HASH_COLUMN, LABEL_COLUMN, REMOVE_ANNOTATION, ROI_COLUMN,
};

// Re-export schemas
pub use featstore_schema::{
    input_and_internal_schemas, Check, ColumnSpec, DataType, FrameSchema, SchemaError, Strictness,
};

// Re-export the store and predictors
pub use featstore_classifier::{
    BatchOutcome, Classifier, ClassifierConfig, FeatureMatrix, FeatureRow, FeatureStore,
    MergeReport, NearestCentroid, Predictor, SeededRandom, SharedClassifier,
};

/// Snapshot serialization and persistence
pub mod storage {
    pub use featstore_storage::{decode, encode, load, save, SnapshotFile, StoreSnapshot};
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BatchOutcome, Classifier, ClassifierConfig, CompositeKey, Error, FeatureStore, Frame,
        MergeReport, Predictor, Result, Value,
    };
    pub use crate::storage::SnapshotFile;
}
