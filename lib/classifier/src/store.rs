use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use featstore_core::{
    Column, CompositeKey, Error, Frame, Result, Value, ANNOTATION_COLUMN, HASH_COLUMN,
    LABEL_COLUMN, ROI_COLUMN,
};
use featstore_schema::{input_and_internal_schemas, FrameSchema};

use crate::report::{BatchOutcome, MergeReport};
use crate::row::FeatureRow;

/// The accumulated, key-indexed feature table.
///
/// Feature and class names are fixed at construction. The table only
/// changes through [`add_features`](Self::add_features), which is atomic: a
/// batch is either merged completely or not at all.
///
/// The store does no internal locking. Writers must be serialized by the
/// caller, see [`SharedClassifier`](crate::SharedClassifier).
#[derive(Debug, Clone)]
pub struct FeatureStore {
    feature_names: Vec<String>,
    class_names: Vec<String>,
    index_columns: [String; 2],
    input_schema: FrameSchema,
    internal_schema: FrameSchema,
    rows: BTreeMap<CompositeKey, FeatureRow>,
}

impl FeatureStore {
    /// Create an empty store keyed by `roi_id` and `label`
    pub fn new<F, C>(feature_names: &[F], class_names: &[C]) -> Result<Self>
    where
        F: AsRef<str>,
        C: AsRef<str>,
    {
        Self::with_index_columns(feature_names, class_names, [ROI_COLUMN, LABEL_COLUMN])
    }

    /// Create an empty store with custom names for the two key columns
    pub fn with_index_columns<F, C>(
        feature_names: &[F],
        class_names: &[C],
        index_columns: [&str; 2],
    ) -> Result<Self>
    where
        F: AsRef<str>,
        C: AsRef<str>,
    {
        let (input_schema, internal_schema) =
            input_and_internal_schemas(feature_names, class_names, &index_columns)?;
        Ok(Self {
            feature_names: feature_names.iter().map(|f| f.as_ref().to_string()).collect(),
            class_names: class_names.iter().map(|c| c.as_ref().to_string()).collect(),
            index_columns: index_columns.map(str::to_string),
            input_schema,
            internal_schema,
            rows: BTreeMap::new(),
        })
    }

    /// Rebuild a store from previously stored rows.
    ///
    /// Every row is checked against the configuration and the result must
    /// conform to the internal schema.
    pub fn restore<F, C>(
        feature_names: &[F],
        class_names: &[C],
        index_columns: [&str; 2],
        rows: impl IntoIterator<Item = FeatureRow>,
    ) -> Result<Self>
    where
        F: AsRef<str>,
        C: AsRef<str>,
    {
        let mut store = Self::with_index_columns(feature_names, class_names, index_columns)?;
        for row in rows {
            if row.features.len() != store.feature_names.len() {
                return Err(Error::violation(
                    "features",
                    None,
                    format!(
                        "row {} has {} feature values, expected {}",
                        row.key,
                        row.features.len(),
                        store.feature_names.len()
                    ),
                ));
            }
            if row.hash != row.key.normalized_hash() {
                return Err(Error::violation(
                    HASH_COLUMN,
                    None,
                    format!("stored hash of {} does not match its key", row.key),
                ));
            }
            if let Some(previous) = store.rows.insert(row.key.clone(), row) {
                return Err(Error::violation(
                    store.index_columns.join(", "),
                    None,
                    format!("duplicate key {}", previous.key),
                ));
            }
        }
        store.check_conformance()?;
        Ok(store)
    }

    /// Validate a raw batch and merge it into the store.
    ///
    /// Rows without an annotation and rows with a missing key or feature
    /// value are dropped and counted in the report. The remaining rows must
    /// satisfy the input schema, otherwise the whole batch is rejected and
    /// the store is left unchanged. Valid rows replace stored rows with the
    /// same key; rows annotated `-1` delete their key from the store.
    pub fn add_features(&mut self, batch: &Frame) -> Result<MergeReport> {
        let mut report = MergeReport {
            total_rows: batch.n_rows(),
            ..Default::default()
        };

        let incoming = self.validate_batch(batch, &mut report)?;

        for row in incoming {
            if row.is_removal() {
                if self.rows.remove(&row.key).is_some() {
                    report.removed += 1;
                }
            } else if self.rows.insert(row.key.clone(), row).is_some() {
                report.replaced += 1;
            } else {
                report.added += 1;
            }
        }

        info!(
            added = report.added,
            replaced = report.replaced,
            removed = report.removed,
            stored = self.rows.len(),
            "Merged feature batch"
        );
        Ok(report)
    }

    /// Add several named batches, one independent merge per batch.
    ///
    /// When a batch has no region column it is filled with the batch name. A
    /// failing batch does not undo the batches merged before it, and later
    /// batches are still attempted.
    pub fn add_batch_of_feature_sets<I, S>(&mut self, batches: I) -> Vec<BatchOutcome<MergeReport>>
    where
        I: IntoIterator<Item = (S, Frame)>,
        S: Into<String>,
    {
        batches
            .into_iter()
            .map(|(name, mut frame)| {
                let name = name.into();
                debug!(batch = %name, rows = frame.n_rows(), "Adding features for batch");
                let result = self
                    .fill_region_column(&name, &mut frame)
                    .and_then(|()| self.add_features(&frame));
                if let Err(e) = &result {
                    warn!(batch = %name, error = %e, "Rejected feature batch");
                }
                BatchOutcome { name, result }
            })
            .collect()
    }

    fn fill_region_column(&self, name: &str, frame: &mut Frame) -> Result<()> {
        let roi = &self.index_columns[0];
        if frame.has_column(roi) {
            return Ok(());
        }
        frame.push_constant(roi.as_str(), Value::from(name))
    }

    /// Drop soft failures, validate, and convert to typed rows
    fn validate_batch(&self, batch: &Frame, report: &mut MergeReport) -> Result<Vec<FeatureRow>> {
        let mut frame = batch.clone();

        let annotations = frame
            .column(ANNOTATION_COLUMN)
            .ok_or_else(|| Error::violation(ANNOTATION_COLUMN, None, "column is missing"))?;
        let keep: Vec<bool> = annotations.values.iter().map(|v| !v.is_missing()).collect();
        report.missing_annotation = frame.retain_rows(|i| keep[i]);

        // Columns that are absent altogether are left for the validator to report
        let required: Vec<&Column> = self
            .index_columns
            .iter()
            .chain(self.feature_names.iter())
            .filter_map(|name| frame.column(name))
            .collect();
        let keep: Vec<bool> = (0..frame.n_rows())
            .map(|i| required.iter().all(|c| !c.values[i].is_missing()))
            .collect();
        report.incomplete_features = frame.retain_rows(|i| keep[i]);

        if report.dropped() > 0 {
            warn!(
                missing_annotation = report.missing_annotation,
                incomplete_features = report.incomplete_features,
                "Dropped {}/{} objects without annotation or with missing values",
                report.dropped(),
                report.total_rows
            );
        }

        let valid = self.input_schema.validate(&frame)?;
        self.rows_from_valid(&valid)
    }

    fn rows_from_valid(&self, valid: &Frame) -> Result<Vec<FeatureRow>> {
        let roi = valid.require(&self.index_columns[0])?;
        let label = valid.require(&self.index_columns[1])?;
        let annotations = valid.require(ANNOTATION_COLUMN)?;
        let features = self
            .feature_names
            .iter()
            .map(|name| valid.require(name))
            .collect::<Result<Vec<_>>>()?;

        (0..valid.n_rows())
            .map(|i| {
                let key = match (&roi.values[i], &label.values[i]) {
                    (Value::Str(r), Value::UInt(l)) => CompositeKey::new(r.clone(), *l),
                    _ => return Err(Error::violation(&roi.name, Some(i), "invalid composite key")),
                };
                let Value::Int(annotation) = annotations.values[i] else {
                    return Err(Error::violation(ANNOTATION_COLUMN, Some(i), "invalid annotation"));
                };
                let values = features
                    .iter()
                    .map(|c| match c.values[i] {
                        Value::Float(x) => Ok(x as f32),
                        _ => Err(Error::violation(&c.name, Some(i), "invalid feature value")),
                    })
                    .collect::<Result<Vec<f32>>>()?;
                Ok(FeatureRow::new(key, annotation, values))
            })
            .collect()
    }

    /// Re-validate the stored table against the internal schema
    pub fn check_conformance(&self) -> Result<()> {
        self.internal_schema.validate(&self.to_frame()).map(|_| ())
    }

    /// The stored table as a frame: key columns, annotations, features, hash
    pub fn to_frame(&self) -> Frame {
        let n = self.rows.len();
        let mut roi = Vec::with_capacity(n);
        let mut label = Vec::with_capacity(n);
        let mut annotations = Vec::with_capacity(n);
        let mut features = vec![Vec::with_capacity(n); self.feature_names.len()];
        let mut hashes = Vec::with_capacity(n);

        for row in self.rows.values() {
            roi.push(Value::from(row.key.roi_id.as_str()));
            label.push(Value::UInt(row.key.label));
            annotations.push(Value::Int(row.annotation));
            for (column, value) in features.iter_mut().zip(&row.features) {
                column.push(Value::from(*value));
            }
            hashes.push(Value::Float(row.hash));
        }

        let mut columns = vec![
            Column::new(self.index_columns[0].clone(), roi),
            Column::new(self.index_columns[1].clone(), label),
            Column::new(ANNOTATION_COLUMN, annotations),
        ];
        columns.extend(
            self.feature_names
                .iter()
                .zip(features)
                .map(|(name, values)| Column::new(name.clone(), values)),
        );
        columns.push(Column::new(HASH_COLUMN, hashes));

        // Names are distinct and lengths equal by construction
        Frame::from_columns(columns).unwrap_or_default()
    }

    pub fn get_class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn get_feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn index_columns(&self) -> [&str; 2] {
        [&self.index_columns[0], &self.index_columns[1]]
    }

    pub fn input_schema(&self) -> &FrameSchema {
        &self.input_schema
    }

    pub fn internal_schema(&self) -> &FrameSchema {
        &self.internal_schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&FeatureRow> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.rows.contains_key(key)
    }

    /// Stored rows in key order
    pub fn rows(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.values()
    }
}

impl fmt::Display for FeatureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FeatureStore (features: {}; classes: {})",
            self.feature_names.join(", "),
            self.class_names.join(", ")
        )?;
        write!(f, "{}", self.to_frame())
    }
}
