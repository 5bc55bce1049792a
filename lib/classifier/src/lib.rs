//! # featstore Classifier
//!
//! The feature store and the prediction contract built on top of it.
//!
//! ## Features
//!
//! - **Feature store**: one key-indexed table per classifier, merged batch by
//!   batch with all-or-nothing validation
//! - **Re-annotation**: a new row for an existing key replaces the old one,
//!   an annotation of `-1` removes the key
//! - **Soft drops**: rows without annotation or with missing values are
//!   dropped and counted in a [`MergeReport`], never raised
//! - **Pluggable prediction**: any [`Predictor`] can be attached to a
//!   [`Classifier`]; the store never depends on an algorithm
//!
//! ## Example
//!
//! ```rust
//! use featstore_classifier::Classifier;
//! use featstore_core::Frame;
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
//! assert_eq!(report.missing_annotation, 1);
//!
//! classifier.train();
//! let classes = classifier.predict(&batch).unwrap();
//! assert_eq!(classes.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  raw Frame  │────>│ FeatureStore│────>│  key-indexed│
//! │  (batch)    │     │ (validate)  │     │    rows     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │  Predictor  │<──────────┘
//!                      │  (strategy) │   train
//!                      └─────────────┘
//! ```

pub mod classifier;
pub mod predict;
pub mod report;
pub mod row;
pub mod shared;
pub mod store;

// Re-export main types for convenience
pub use classifier::{Classifier, ClassifierConfig};
pub use predict::{FeatureMatrix, NearestCentroid, Predictor, SeededRandom};
pub use report::{BatchOutcome, MergeReport};
pub use row::FeatureRow;
pub use shared::SharedClassifier;
pub use store::FeatureStore;
