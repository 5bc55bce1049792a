//! Column-oriented tables of loosely typed cells
//!
//! A [`Frame`] is what callers hand to the feature store: one column per
//! named attribute, all columns of equal length. It carries no schema of its
//! own; schemas validate and coerce frames into a typed shape.

use ahash::AHashMap;
use std::fmt;

use crate::{Error, Result, Value};

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of equally long columns
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<Column>,
    lookup: AHashMap<String, usize>,
    n_rows: usize,
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.n_rows == other.n_rows && self.columns == other.columns
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from columns, checking names and lengths
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut frame = Self::new();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.lookup.contains_key(&column.name) {
            return Err(Error::InvalidInput(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(Error::LengthMismatch {
                expected: self.n_rows,
                actual: column.len(),
                column: column.name,
            });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        }
        self.lookup.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style [`push_column`](Self::push_column)
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let values = values.into_iter().map(Into::into).collect();
        self.push_column(Column::new(name, values))?;
        Ok(self)
    }

    /// Add a column holding the same value on every row
    pub fn push_constant(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let values = vec![value; self.n_rows];
        self.push_column(Column::new(name, values))
    }

    /// Build a frame from a JSON array of objects.
    ///
    /// Column order follows first appearance; keys absent from a record
    /// become `Null` cells.
    pub fn from_records(records: &serde_json::Value) -> Result<Self> {
        let rows = records
            .as_array()
            .ok_or_else(|| Error::InvalidInput("expected a JSON array of records".to_string()))?;

        let mut names: Vec<String> = Vec::new();
        let mut seen: AHashMap<String, usize> = AHashMap::new();
        for (i, row) in rows.iter().enumerate() {
            let object = row
                .as_object()
                .ok_or_else(|| Error::InvalidInput(format!("record {} is not an object", i)))?;
            for key in object.keys() {
                if !seen.contains_key(key) {
                    seen.insert(key.clone(), names.len());
                    names.push(key.clone());
                }
            }
        }

        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for row in rows {
            // Checked above
            if let Some(object) = row.as_object() {
                for (name, column) in names.iter().zip(columns.iter_mut()) {
                    let cell = match object.get(name) {
                        Some(v) => Value::from_json(v)?,
                        None => Value::Null,
                    };
                    column.push(cell);
                }
            }
        }

        let mut frame = Self::new();
        for (name, values) in names.into_iter().zip(columns) {
            frame.push_column(Column::new(name, values))?;
        }
        // A frame of records without keys still knows its height
        if frame.columns.is_empty() {
            frame.n_rows = rows.len();
        }
        Ok(frame)
    }

    /// Render the frame as a JSON array of objects
    pub fn to_records(&self) -> serde_json::Value {
        let rows = (0..self.n_rows)
            .map(|i| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[i].to_json()))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.lookup.get(name).map(|&i| &self.columns[i])
    }

    /// Like [`column`](Self::column) but missing columns are an error
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at `row` of column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// All cells of one row, in column order
    pub fn row(&self, row: usize) -> Option<Vec<(&str, &Value)>> {
        if row >= self.n_rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), &c.values[row]))
                .collect(),
        )
    }

    /// Keep only the rows for which `keep(row_index)` is true.
    /// Returns the number of rows removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(usize) -> bool,
    {
        let mask: Vec<bool> = (0..self.n_rows).map(&mut keep).collect();
        let kept = mask.iter().filter(|k| **k).count();
        for column in &mut self.columns {
            let mut i = 0;
            column.values.retain(|_| {
                let k = mask[i];
                i += 1;
                k
            });
        }
        let removed = self.n_rows - kept;
        self.n_rows = kept;
        removed
    }

    /// New frame with the named columns in the given order
    pub fn select(&self, names: &[&str]) -> Result<Frame> {
        let mut out = Frame::new();
        for name in names {
            out.push_column(self.require(name)?.clone())?;
        }
        if names.is_empty() {
            out.n_rows = self.n_rows;
        }
        Ok(out)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.column_names().join("\t"))?;
        for i in 0..self.n_rows {
            let cells: Vec<String> = self
                .row(i)
                .unwrap_or_default()
                .iter()
                .map(|(_, value)| value.to_string())
                .collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        write!(f, "[{} rows x {} columns]", self.n_rows, self.columns.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Frame {
        Frame::new()
            .with_column("roi_id", ["A", "A", "B"])
            .unwrap()
            .with_column("label", [1u64, 2, 1])
            .unwrap()
            .with_column("f1", [0.1, 0.2, 0.3])
            .unwrap()
    }

    #[test]
    fn test_frame_shape() {
        let frame = sample();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_columns(), 3);
        assert_eq!(frame.column_names(), vec!["roi_id", "label", "f1"]);
        assert_eq!(frame.get(1, "label"), Some(&Value::UInt(2)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = sample().with_column("f2", [1.0, 2.0]);
        match result {
            Err(Error::LengthMismatch { column, expected, actual }) => {
                assert_eq!(column, "f2");
                assert_eq!((expected, actual), (3, 2));
            }
            other => panic!("expected length mismatch, got {:?}", other.map(|f| f.n_rows())),
        }
    }

    #[test]
    fn test_row_access() {
        let frame = sample();
        let row = frame.row(2).unwrap();
        assert_eq!(row[0], ("roi_id", &Value::from("B")));
        assert_eq!(row[2], ("f1", &Value::Float(0.3)));
        assert!(frame.row(3).is_none());
        assert!(frame.to_string().contains("B\t1\t0.3"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = sample().with_column("f1", [1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_retain_rows() {
        let mut frame = sample();
        let removed = frame.retain_rows(|i| i != 1);
        assert_eq!(removed, 1);
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.get(1, "roi_id"), Some(&Value::from("B")));
    }

    #[test]
    fn test_from_records_fills_missing_keys() {
        let frame = Frame::from_records(&json!([
            {"roi_id": "A", "label": 1, "annotations": 1},
            {"roi_id": "A", "label": 2}
        ]))
        .unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.get(1, "annotations"), Some(&Value::Null));
        assert_eq!(frame.get(0, "label"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_records_round_trip_through_json() {
        let frame = sample();
        let back = Frame::from_records(&frame.to_records()).unwrap();
        assert_eq!(back.get(2, "roi_id"), Some(&Value::from("B")));
        assert_eq!(back.get(2, "f1"), Some(&Value::Float(0.3)));
    }

    #[test]
    fn test_select_orders_columns() {
        let frame = sample().select(&["f1", "roi_id"]).unwrap();
        assert_eq!(frame.column_names(), vec!["f1", "roi_id"]);
        assert!(sample().select(&["missing"]).is_err());
    }

    #[test]
    fn test_push_constant() {
        let mut frame = sample();
        frame.push_constant("batch", Value::from("roi_7")).unwrap();
        assert_eq!(frame.get(2, "batch"), Some(&Value::from("roi_7")));
    }
}
