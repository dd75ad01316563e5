use ndarray::{Array1, ArrayView1};
use serde::Serialize;

/// A single-feature linear model: `y = weight * x + bias`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    weight: f64,
    bias: f64,
}

impl LinearModel {
    /// Returns a new `LinearModel` with the given parameters.
    pub fn new(weight: f64, bias: f64) -> Self {
        Self { weight, bias }
    }

    /// A model with both parameters at zero.
    pub fn zeros() -> Self {
        Self::default()
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Returns whether both parameters are finite.
    pub fn is_finite(&self) -> bool {
        self.weight.is_finite() && self.bias.is_finite()
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.weight * x + self.bias
    }

    /// Predicts every feature in `xs`, keeping their order.
    pub fn predict_batch(&self, xs: &[f64]) -> Array1<f64> {
        self.predict_view(ArrayView1::from(xs))
    }

    pub fn predict_view(&self, xs: ArrayView1<f64>) -> Array1<f64> {
        xs.mapv(|x| self.predict(x))
    }

    /// Moves the parameters by `-(d_weight, d_bias)`.
    pub(crate) fn descend(&mut self, d_weight: f64, d_bias: f64) {
        self.weight -= d_weight;
        self.bias -= d_bias;
    }
}
