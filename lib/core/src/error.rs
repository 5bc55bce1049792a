use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A batch failed type coercion, a column check or the uniqueness check.
    /// The whole batch is rejected.
    #[error("Schema violation{}{}: {reason}", fmt_column(.column), fmt_row(.row))]
    SchemaViolation {
        column: Option<String>,
        row: Option<usize>,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column length mismatch for '{column}': expected {expected}, got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn violation(
        column: impl Into<String>,
        row: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Error::SchemaViolation {
            column: Some(column.into()),
            row,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Error::SchemaViolation { .. })
    }
}

fn fmt_column(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" in column '{}'", c))
        .unwrap_or_default()
}

fn fmt_row(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}
