use log::info;
use serde::Serialize;

use crate::{
    MlErr, Result,
    batches::{BatchConfig, BatchSource},
    model::LinearModel,
};

/// Prediction quality of a model over a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    mse: f64,
    rmse: f64,
    predictions: Vec<f64>,
}

impl EvaluationResult {
    /// Scores `predictions` against `targets`, paired by index.
    ///
    /// # Errors
    /// `EmptyDataset` if there are no predictions, `SizeMismatch` if the lengths differ.
    pub fn from_predictions(predictions: Vec<f64>, targets: &[f64]) -> Result<Self> {
        if predictions.len() != targets.len() {
            return Err(MlErr::SizeMismatch {
                what: "predictions",
                got: predictions.len(),
                expected: targets.len(),
            });
        }

        if predictions.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let squared: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(p, y)| (p - y).powi(2))
            .sum();
        let mse = squared / predictions.len() as f64;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            predictions,
        })
    }

    pub fn mse(&self) -> f64 {
        self.mse
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    /// One prediction per dataset row, in row order.
    pub fn predictions(&self) -> &[f64] {
        &self.predictions
    }
}

/// Replays a dataset once, unshuffled, through a frozen model.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    batches: BatchConfig,
}

impl Evaluator {
    /// Returns a new `Evaluator` reading `batch_size` rows at a time.
    ///
    /// The batch size only changes how the dataset is read, not the result.
    ///
    /// # Errors
    /// `InvalidConfig` if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self> {
        Ok(Self {
            batches: BatchConfig::single_pass(batch_size)?,
        })
    }

    /// Predicts every row of `source` with `model` and scores the predictions.
    ///
    /// # Errors
    /// `EmptyDataset` if the pass produced no rows.
    pub fn evaluate(&self, source: &BatchSource, model: &LinearModel) -> Result<EvaluationResult> {
        let mut predictions = Vec::with_capacity(source.len());
        let mut targets = Vec::with_capacity(source.len());

        for batch in source.configure(&self.batches) {
            predictions.extend(model.predict_batch(&batch.xs));
            targets.extend_from_slice(&batch.ys);
        }

        let result = EvaluationResult::from_predictions(predictions, &targets)?;
        info!(
            "evaluated {} rows: mse={:.3} rmse={:.3}",
            targets.len(),
            result.mse,
            result.rmse
        );

        Ok(result)
    }
}
