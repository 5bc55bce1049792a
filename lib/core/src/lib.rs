//! # featstore Core
//!
//! Core library for the featstore feature table.
//!
//! This crate provides the fundamental data structures shared by the other
//! featstore crates:
//!
//! - [`Value`] - A loosely typed table cell
//! - [`Frame`] - Column-oriented batch of cells, as supplied by callers
//! - [`CompositeKey`] - The (region, label) identity of an object
//! - [`hash`] - Deterministic identity hashing into `[0, 1)`
//! - [`Error`] - The error taxonomy used across the workspace
//!
//! ## Example
//!
//! ```rust
//! use featstore_core::{CompositeKey, Frame};
//!
//! let frame = Frame::new()
//!     .with_column("roi_id", ["A", "A"]).unwrap()
//!     .with_column("label", [1u64, 2]).unwrap()
//!     .with_column("annotations", [Some(1i64), None]).unwrap();
//! assert_eq!(frame.n_rows(), 2);
//!
//! let h = CompositeKey::new("A", 1).normalized_hash();
//! assert!((0.0..1.0).contains(&h));
//! ```

pub mod error;
pub mod frame;
pub mod hash;
pub mod key;
pub mod value;

pub use error::{Error, Result};
pub use frame::{Column, Frame};
pub use hash::{hash_object_id, join_key_parts, random_object_id};
pub use key::{CompositeKey, LABEL_COLUMN, ROI_COLUMN};
pub use value::Value;

/// Name of the annotation column
pub const ANNOTATION_COLUMN: &str = "annotations";

/// Name of the derived identity hash column
pub const HASH_COLUMN: &str = "hash";

/// Annotation value requesting removal of an object from the store
pub const REMOVE_ANNOTATION: i64 = -1;
