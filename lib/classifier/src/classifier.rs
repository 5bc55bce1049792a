use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::{debug, info};

use featstore_core::{Error, Frame, Result};

use crate::predict::{FeatureMatrix, NearestCentroid, Predictor};
use crate::report::{BatchOutcome, MergeReport};
use crate::store::FeatureStore;

/// Configuration a classifier is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
}

impl ClassifierConfig {
    pub fn new<F, C>(feature_names: &[F], class_names: &[C]) -> Self
    where
        F: AsRef<str>,
        C: AsRef<str>,
    {
        Self {
            feature_names: feature_names.iter().map(|f| f.as_ref().to_string()).collect(),
            class_names: class_names.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Read a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        serde_json::from_slice(&data)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.as_ref().display(), e)))
    }
}

/// A feature store paired with a swappable prediction strategy
#[derive(Debug)]
pub struct Classifier {
    store: FeatureStore,
    predictor: Box<dyn Predictor>,
}

impl Classifier {
    /// Create a classifier with an empty store and an untrained
    /// [`NearestCentroid`] predictor
    pub fn new<F, C>(feature_names: &[F], class_names: &[C]) -> Result<Self>
    where
        F: AsRef<str>,
        C: AsRef<str>,
    {
        Ok(Self::from_store(FeatureStore::new(feature_names, class_names)?))
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Self::new(&config.feature_names, &config.class_names)
    }

    pub fn from_store(store: FeatureStore) -> Self {
        Self {
            store,
            predictor: Box::new(NearestCentroid::default()),
        }
    }

    #[must_use]
    pub fn with_predictor(mut self, predictor: Box<dyn Predictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn set_predictor(&mut self, predictor: Box<dyn Predictor>) {
        self.predictor = predictor;
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn into_store(self) -> FeatureStore {
        self.store
    }

    pub fn config(&self) -> ClassifierConfig {
        ClassifierConfig::new(self.store.get_feature_names(), self.store.get_class_names())
    }

    pub fn add_features(&mut self, batch: &Frame) -> Result<MergeReport> {
        self.store.add_features(batch)
    }

    pub fn add_batch_of_feature_sets<I, S>(&mut self, batches: I) -> Vec<BatchOutcome<MergeReport>>
    where
        I: IntoIterator<Item = (S, Frame)>,
        S: Into<String>,
    {
        self.store.add_batch_of_feature_sets(batches)
    }

    /// Fit a [`NearestCentroid`] on the stored rows and make it the
    /// predictor. Returns the number of rows used.
    pub fn train(&mut self) -> usize {
        let model = NearestCentroid::fit(&self.store);
        info!(
            rows = self.store.len(),
            classes = model.centroids().len(),
            "Trained nearest-centroid classifier"
        );
        self.predictor = Box::new(model);
        self.store.len()
    }

    /// One class per row of `batch`, in row order.
    ///
    /// The batch only needs the configured feature columns. The predictor's
    /// output is checked against the contract: one value per row, each in
    /// `1..=n_classes`.
    pub fn predict(&self, batch: &Frame) -> Result<Vec<i64>> {
        let features = FeatureMatrix::from_frame(batch, self.store.get_feature_names())?;
        let n_classes = self.store.get_class_names().len();
        let predictions = self.predictor.predict(&features, n_classes)?;

        if predictions.len() != features.n_rows() {
            return Err(Error::Prediction(format!(
                "{} returned {} predictions for {} rows",
                self.predictor.name(),
                predictions.len(),
                features.n_rows()
            )));
        }
        if let Some(bad) = predictions.iter().find(|p| !(1..=n_classes as i64).contains(*p)) {
            return Err(Error::Prediction(format!(
                "{} predicted class {} outside 1..={}",
                self.predictor.name(),
                bad,
                n_classes
            )));
        }
        Ok(predictions)
    }

    /// Predict each named batch independently, keeping names and order
    pub fn predict_on_many<I, S>(&self, batches: I) -> Vec<BatchOutcome<Vec<i64>>>
    where
        I: IntoIterator<Item = (S, Frame)>,
        S: Into<String>,
    {
        batches
            .into_iter()
            .map(|(name, frame)| {
                let name = name.into();
                debug!(batch = %name, rows = frame.n_rows(), "Making a prediction");
                let result = self.predict(&frame);
                BatchOutcome { name, result }
            })
            .collect()
    }
}
