//! Generic frame validator
//!
//! Validation is all-or-nothing: the first failing column, cell or key
//! aborts with a [`SchemaViolation`](featstore_core::Error::SchemaViolation)
//! and no output frame is produced.

use ahash::AHashMap;

use featstore_core::{Column, Error, Frame, Result, Value};

use crate::coerce::{coerce, is_exact};
use crate::{ColumnSpec, FrameSchema, Strictness};

impl FrameSchema {
    /// Validate `frame` and return it coerced into schema column order.
    ///
    /// Index columns come first, then data columns. Unknown columns are
    /// handled according to [`Strictness`].
    pub fn validate(&self, frame: &Frame) -> Result<Frame> {
        let mut out = Frame::new();
        for spec in self.all_columns() {
            let column = frame
                .column(&spec.name)
                .ok_or_else(|| Error::violation(&spec.name, None, "column is missing"))?;
            out.push_column(validate_column(spec, column)?)?;
        }

        for column in frame.columns() {
            if self.get_column(&column.name).is_some() {
                continue;
            }
            match self.strict {
                Strictness::Filter => {}
                Strictness::Strict => {
                    return Err(Error::violation(
                        &column.name,
                        None,
                        "column is not defined in the schema",
                    ))
                }
                Strictness::Lax => out.push_column(column.clone())?,
            }
        }

        self.check_unique(&out)?;
        Ok(out)
    }

    /// Like [`validate`](Self::validate) but only reports success
    pub fn is_valid(&self, frame: &Frame) -> bool {
        self.validate(frame).is_ok()
    }

    fn check_unique(&self, frame: &Frame) -> Result<()> {
        if self.unique.is_empty() {
            return Ok(());
        }
        let columns = self
            .unique
            .iter()
            .map(|name| frame.require(name))
            .collect::<Result<Vec<_>>>()?;

        let mut seen: AHashMap<Vec<String>, usize> = AHashMap::with_capacity(frame.n_rows());
        for row in 0..frame.n_rows() {
            let key: Vec<String> = columns.iter().map(|c| c.values[row].to_string()).collect();
            if let Some(first) = seen.insert(key.clone(), row) {
                return Err(Error::SchemaViolation {
                    column: Some(self.unique.join(", ")),
                    row: Some(row),
                    reason: format!(
                        "duplicate key ({}) also found at row {}",
                        key.join(", "),
                        first
                    ),
                });
            }
        }
        Ok(())
    }
}

fn validate_column(spec: &ColumnSpec, column: &Column) -> Result<Column> {
    let mut values = Vec::with_capacity(column.len());
    for (row, value) in column.values.iter().enumerate() {
        let cell = if spec.coerce {
            coerce(value, spec.dtype).ok_or_else(|| {
                Error::violation(
                    &spec.name,
                    Some(row),
                    format!(
                        "cannot coerce {} ({}) to {}",
                        value,
                        value.type_name(),
                        spec.dtype
                    ),
                )
            })?
        } else if is_exact(value, spec.dtype) {
            value.clone()
        } else {
            return Err(Error::violation(
                &spec.name,
                Some(row),
                format!("expected {}, got {}", spec.dtype, value.type_name()),
            ));
        };

        if cell.is_missing() {
            if !spec.nullable {
                return Err(Error::violation(
                    &spec.name,
                    Some(row),
                    "missing value in non-nullable column",
                ));
            }
            values.push(Value::Null);
            continue;
        }

        if let Some(check) = spec.checks.iter().find(|c| !c.holds(&cell)) {
            return Err(Error::violation(
                &spec.name,
                Some(row),
                format!("value {} fails check {}", cell, check),
            ));
        }
        values.push(cell);
    }
    Ok(Column::new(spec.name.clone(), values))
}
