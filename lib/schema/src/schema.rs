//! Frame schema definitions
//!
//! A schema is plain data: an ordered list of column specs (name, type,
//! coercion rule, nullability, checks) plus table-level rules for unknown
//! columns and key uniqueness. The generic validator in
//! [`validate`](crate::validate) interprets it.

use serde::{Deserialize, Serialize};
use std::fmt;

use featstore_core::Value;

/// Frame schema
///
/// Index columns identify rows and come first in validated output. Data
/// columns follow in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameSchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Identity columns, empty for flat schemas
    #[serde(default)]
    pub index: Vec<ColumnSpec>,

    /// Data columns in output order
    pub columns: Vec<ColumnSpec>,

    /// What to do with columns the schema does not name
    #[serde(default)]
    pub strict: Strictness,

    /// Columns whose combined values must be unique per row
    #[serde(default)]
    pub unique: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl FrameSchema {
    /// Create a flat schema with the given data columns
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let schema = Self {
            version: 1,
            index: Vec::new(),
            columns,
            strict: Strictness::default(),
            unique: Vec::new(),
        };
        schema.check_names()?;
        Ok(schema)
    }

    pub fn with_strictness(mut self, strict: Strictness) -> Self {
        self.strict = strict;
        self
    }

    /// Require the combination of `names` to be unique across rows
    pub fn with_unique<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, SchemaError> {
        for name in names {
            if self.get_column(name.as_ref()).is_none() {
                return Err(SchemaError::ColumnNotFound(name.as_ref().to_string()));
            }
        }
        self.unique = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(self)
    }

    /// Move the named data columns into the index.
    ///
    /// The index becomes the uniqueness key of the schema.
    pub fn set_index<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, SchemaError> {
        let mut index = Vec::with_capacity(names.len());
        for name in names {
            let pos = self
                .columns
                .iter()
                .position(|c| c.name == name.as_ref())
                .ok_or_else(|| SchemaError::ColumnNotFound(name.as_ref().to_string()))?;
            index.push(self.columns.remove(pos));
        }
        self.index = index;
        self.unique = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(self)
    }

    /// Append data columns
    pub fn add_columns(mut self, columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        self.columns.extend(columns);
        self.check_names()?;
        Ok(self)
    }

    /// Index columns followed by data columns
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.index.iter().chain(self.columns.iter())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.all_columns().map(|c| c.name.as_str()).collect()
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.index.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column spec (index or data) by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.all_columns().find(|c| c.name == name)
    }

    fn check_names(&self) -> Result<(), SchemaError> {
        let mut seen = ahash::AHashSet::new();
        for column in self.all_columns() {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(())
    }
}

/// Handling of columns not named by the schema
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Drop unknown columns from the output
    #[default]
    Filter,
    /// Reject frames with unknown columns
    Strict,
    /// Pass unknown columns through untouched
    Lax,
}

/// Specification of a single column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub dtype: DataType,

    /// Convert compatible cells into `dtype` instead of requiring an exact type
    #[serde(default)]
    pub coerce: bool,

    /// Allow missing cells
    #[serde(default)]
    pub nullable: bool,

    /// Constraints every non-missing cell must satisfy
    #[serde(default)]
    pub checks: Vec<Check>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            coerce: false,
            nullable: false,
            checks: Vec::new(),
        }
    }

    /// Coercing column of the given type
    pub fn coerced(name: impl Into<String>, dtype: DataType) -> Self {
        Self::new(name, dtype).with_coerce(true)
    }

    pub fn with_coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// Cell type of a column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::UInt64 => "uint64",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// Constraint on non-missing cells of a column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// `min <= v <= max`
    Between { min: f64, max: f64 },
    /// `1 <= v <= n_classes`, or the removal sentinel `-1`
    AnnotationRange { n_classes: usize },
}

impl Check {
    /// Whether an already coerced cell satisfies the check
    pub fn holds(&self, value: &Value) -> bool {
        let Some(v) = value.as_f64() else {
            return false;
        };
        match self {
            Check::Between { min, max } => *min <= v && v <= *max,
            Check::AnnotationRange { n_classes } => {
                v == featstore_core::REMOVE_ANNOTATION as f64
                    || (1.0 <= v && v <= *n_classes as f64)
            }
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Between { min, max } => write!(f, "between({}, {})", min, max),
            Check::AnnotationRange { n_classes } => {
                write!(f, "in 1..={} or -1", n_classes)
            }
        }
    }
}

/// Errors that can occur while building a schema
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Feature names cannot be empty")]
    EmptyFeatureNames,

    #[error("Class names cannot be empty")]
    EmptyClassNames,

    #[error("Name '{0}' is listed more than once")]
    DuplicateName(String),

    #[error("Column '{0}' is defined more than once")]
    DuplicateColumn(String),

    #[error("Name '{0}' is reserved")]
    ReservedName(String),

    #[error("Expected exactly 2 index columns, got {0}")]
    IndexColumnCount(usize),

    #[error("Column '{0}' not found in schema")]
    ColumnNotFound(String),
}

impl From<SchemaError> for featstore_core::Error {
    fn from(e: SchemaError) -> Self {
        featstore_core::Error::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> FrameSchema {
        FrameSchema::new(vec![
            ColumnSpec::coerced("roi_id", DataType::String),
            ColumnSpec::coerced("label", DataType::UInt64),
            ColumnSpec::coerced("f1", DataType::Float32),
        ])
        .unwrap()
    }

    #[test]
    fn test_set_index_moves_columns() {
        let schema = flat().set_index(&["roi_id", "label"]).unwrap();
        assert_eq!(schema.index_names(), vec!["roi_id", "label"]);
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.unique, vec!["roi_id", "label"]);
        assert_eq!(schema.column_names(), vec!["roi_id", "label", "f1"]);
    }

    #[test]
    fn test_set_index_unknown_column() {
        assert!(matches!(
            flat().set_index(&["nope"]),
            Err(SchemaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_add_columns_rejects_duplicates() {
        let result = flat().add_columns(vec![ColumnSpec::new("f1", DataType::Float64)]);
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn test_annotation_range_check() {
        let check = Check::AnnotationRange { n_classes: 2 };
        assert!(check.holds(&Value::Int(1)));
        assert!(check.holds(&Value::Int(2)));
        assert!(check.holds(&Value::Int(-1)));
        assert!(!check.holds(&Value::Int(0)));
        assert!(!check.holds(&Value::Int(3)));
        assert!(!check.holds(&Value::Int(-2)));
    }

    #[test]
    fn test_between_is_inclusive() {
        let check = Check::Between { min: 0.0, max: 1.0 };
        assert!(check.holds(&Value::Float(0.0)));
        assert!(check.holds(&Value::Float(1.0)));
        assert!(!check.holds(&Value::Float(1.5)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let schema = flat()
            .add_columns(vec![ColumnSpec::coerced("hash", DataType::Float64)
                .with_check(Check::Between { min: 0.0, max: 1.0 })])
            .unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let parsed: FrameSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, parsed);
    }
}
