//! # featstore Schema
//!
//! Declarative schemas for feature batches and the stored feature table.
//!
//! ## Overview
//!
//! Two schemas govern every feature store:
//!
//! - The **input schema** describes the batches callers supply: the two key
//!   columns, a nullable `annotations` column and one `float32` column per
//!   feature. Unknown columns are filtered out and the key must be unique.
//! - The **internal schema** is the input schema indexed by the key columns
//!   with an extra `hash` column constrained to `[0, 1]`.
//!
//! Schemas are plain serializable data interpreted by a generic validator,
//! so the rules can be inspected and tested without a store.
//!
//! ## Schema Definition
//!
//! ```rust
//! use featstore_schema::input_and_internal_schemas;
//!
//! let (input, internal) = input_and_internal_schemas(
//!     &["f1", "f2"],
//!     &["healthy", "sick"],
//!     &["roi_id", "label"],
//! ).unwrap();
//!
//! assert_eq!(input.column_names(), vec!["roi_id", "label", "annotations", "f1", "f2"]);
//! assert_eq!(internal.index_names(), vec!["roi_id", "label"]);
//! ```
//!
//! ## Validation Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  raw Frame  │────>│   coerce    │────>│   checks    │
//! │ (any cells) │     │ (per dtype) │     │ (per cell)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌──────┴──────┐
//!                                         │ uniqueness  │
//!                                         │   (key)     │
//!                                         └─────────────┘
//! ```

pub mod builder;
pub mod coerce;
pub mod schema;
pub mod validate;

// Re-export main types
pub use builder::input_and_internal_schemas;
pub use schema::{Check, ColumnSpec, DataType, FrameSchema, SchemaError, Strictness};
