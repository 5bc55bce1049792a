//! Prediction strategies
//!
//! A [`Predictor`] maps a matrix of feature values to one class per row. The
//! store never depends on a concrete algorithm; strategies are swapped on
//! the [`Classifier`](crate::Classifier).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use featstore_core::{Error, Frame, Result, Value};
use featstore_schema::coerce::coerce;
use featstore_schema::DataType;

use crate::FeatureStore;

/// Class assignment capability.
///
/// Implementations must be deterministic for a fixed trained state, return
/// exactly one class per input row, and only use classes in
/// `1..=n_classes`.
pub trait Predictor: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureMatrix, n_classes: usize) -> Result<Vec<i64>>;
}

/// Row-major feature values in a fixed feature order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    /// Extract the named feature columns from a frame.
    ///
    /// Cells are converted to `f32`; missing cells become NaN. Nothing else
    /// about the frame is validated.
    pub fn from_frame<S: AsRef<str>>(frame: &Frame, feature_names: &[S]) -> Result<Self> {
        let columns = feature_names
            .iter()
            .map(|name| frame.require(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..frame.n_rows())
            .map(|i| {
                columns
                    .iter()
                    .map(|c| match coerce(&c.values[i], DataType::Float32) {
                        Some(Value::Float(x)) => Ok(x as f32),
                        Some(_) => Ok(f32::NAN),
                        None => Err(Error::InvalidInput(format!(
                            "feature '{}' at row {} is not numeric: {}",
                            c.name, i, c.values[i]
                        ))),
                    })
                    .collect::<Result<Vec<f32>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            feature_names: feature_names.iter().map(|n| n.as_ref().to_string()).collect(),
            rows,
        })
    }

    pub fn from_rows(feature_names: Vec<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(bad) = rows.iter().position(|r| r.len() != feature_names.len()) {
            return Err(Error::InvalidInput(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                feature_names.len()
            )));
        }
        Ok(Self { feature_names, rows })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Assigns each row to the class whose mean feature vector is closest.
///
/// Missing values are skipped when measuring distance. Before training,
/// or when no class has examples, every row gets class 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroid {
    centroids: Vec<(i64, Vec<f32>)>,
}

impl NearestCentroid {
    /// Fit class centroids from the store's annotated rows
    pub fn fit(store: &FeatureStore) -> Self {
        let n_features = store.get_feature_names().len();
        let n_classes = store.get_class_names().len();
        let mut sums = vec![vec![0f64; n_features]; n_classes];
        let mut counts = vec![0usize; n_classes];

        for row in store.rows() {
            let Ok(class) = usize::try_from(row.annotation - 1) else {
                continue;
            };
            if class >= n_classes {
                continue;
            }
            counts[class] += 1;
            for (sum, value) in sums[class].iter_mut().zip(&row.features) {
                *sum += *value as f64;
            }
        }

        let centroids = sums
            .into_iter()
            .zip(counts)
            .enumerate()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(class, (sum, count))| {
                let mean = sum.into_iter().map(|s| (s / count as f64) as f32).collect();
                (class as i64 + 1, mean)
            })
            .collect();

        Self { centroids }
    }

    pub fn is_trained(&self) -> bool {
        !self.centroids.is_empty()
    }

    /// Trained `(class, centroid)` pairs in class order
    pub fn centroids(&self) -> &[(i64, Vec<f32>)] {
        &self.centroids
    }

    fn closest(&self, row: &[f32]) -> i64 {
        let mut best: Option<(i64, f32)> = None;
        for (class, centroid) in &self.centroids {
            let distance: f32 = row
                .iter()
                .zip(centroid)
                .filter(|(x, _)| !x.is_nan())
                .map(|(x, c)| (x - c) * (x - c))
                .sum();
            // Strict comparison keeps the lowest class on ties
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((*class, distance));
            }
        }
        best.map_or(1, |(class, _)| class)
    }
}

impl Predictor for NearestCentroid {
    fn name(&self) -> &str {
        "nearest-centroid"
    }

    fn predict(&self, features: &FeatureMatrix, _n_classes: usize) -> Result<Vec<i64>> {
        Ok(features.rows().map(|row| self.closest(row)).collect())
    }
}

/// Reproducible random class assignment.
///
/// The same seed and row count always give the same classes. Useful as a
/// stand-in before a real model is trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    pub seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl Predictor for SeededRandom {
    fn name(&self) -> &str {
        "seeded-random"
    }

    fn predict(&self, features: &FeatureMatrix, n_classes: usize) -> Result<Vec<i64>> {
        if n_classes == 0 {
            return Err(Error::Prediction("no classes to predict".to_string()));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok((0..features.n_rows())
            .map(|_| rng.random_range(1..=n_classes as i64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f32>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(vec!["f1".to_string(), "f2".to_string()], rows).unwrap()
    }

    fn trained_store() -> FeatureStore {
        let mut store = FeatureStore::new(&["f1", "f2"], &["low", "high"]).unwrap();
        let frame = Frame::new()
            .with_column("roi_id", ["A", "A", "A", "A"])
            .unwrap()
            .with_column("label", [1u64, 2, 3, 4])
            .unwrap()
            .with_column("annotations", [1i64, 1, 2, 2])
            .unwrap()
            .with_column("f1", [0.0, 0.2, 1.0, 0.8])
            .unwrap()
            .with_column("f2", [0.0, 0.2, 1.0, 0.8])
            .unwrap();
        store.add_features(&frame).unwrap();
        store
    }

    #[test]
    fn test_matrix_from_frame_coerces_and_keeps_order() {
        let frame = Frame::new()
            .with_column("f2", [Value::from("0.5"), Value::Null])
            .unwrap()
            .with_column("f1", [1i64, 2])
            .unwrap();
        let m = FeatureMatrix::from_frame(&frame, &["f1", "f2"]).unwrap();
        assert_eq!(m.row(0).unwrap(), &[1.0, 0.5]);
        assert!(m.row(1).unwrap()[1].is_nan());
    }

    #[test]
    fn test_matrix_rejects_text_features() {
        let frame = Frame::new().with_column("f1", ["big"]).unwrap();
        assert!(FeatureMatrix::from_frame(&frame, &["f1"]).is_err());
    }

    #[test]
    fn test_nearest_centroid_fit_and_predict() {
        let model = NearestCentroid::fit(&trained_store());
        assert!(model.is_trained());
        assert_eq!(model.centroids().len(), 2);

        let m = matrix(vec![vec![0.05, 0.1], vec![0.95, 0.9]]);
        assert_eq!(model.predict(&m, 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_untrained_centroid_predicts_first_class() {
        let model = NearestCentroid::default();
        let m = matrix(vec![vec![0.5, 0.5], vec![0.1, 0.1]]);
        assert_eq!(model.predict(&m, 3).unwrap(), vec![1, 1]);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let model = NearestCentroid::fit(&trained_store());
        let m = matrix(vec![vec![f32::NAN, 0.95]]);
        assert_eq!(model.predict(&m, 2).unwrap(), vec![2]);
    }

    #[test]
    fn test_seeded_random_is_reproducible_and_in_range() {
        let predictor = SeededRandom::new(7);
        let m = matrix(vec![vec![0.0, 0.0]; 50]);
        let a = predictor.predict(&m, 3).unwrap();
        let b = predictor.predict(&m, 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.iter().all(|c| (1..=3).contains(c)));
    }
}
