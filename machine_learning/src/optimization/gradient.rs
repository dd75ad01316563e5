use ndarray::ArrayView1;

use crate::{dataset::Batch, loss::LossFn, model::LinearModel};

/// The gradient of a loss with respect to a `LinearModel`'s weight and bias.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub d_weight: f64,
    pub d_bias: f64,
}

impl Gradient {
    pub fn new(d_weight: f64, d_bias: f64) -> Self {
        Self { d_weight, d_bias }
    }

    /// Evaluates `loss_fn` on `batch` and differentiates it with respect to the model's
    /// parameters.
    ///
    /// # Returns
    /// A tuple with the batch loss and its gradient.
    pub fn compute<L: LossFn>(loss_fn: &L, model: &LinearModel, batch: &Batch) -> (f64, Self) {
        let xs = ArrayView1::from(batch.xs.as_slice());
        let ys = ArrayView1::from(batch.ys.as_slice());

        let y_pred = model.predict_view(xs);
        let loss = loss_fn.loss(y_pred.view(), ys);

        // dL/dw = sum(dL/dy_i * x_i), dL/db = sum(dL/dy_i)
        let d = loss_fn.loss_prime(y_pred.view(), ys);
        let grad = Self {
            d_weight: d.dot(&xs),
            d_bias: d.sum(),
        };

        (loss, grad)
    }

    /// Returns the Euclidean norm of `(d_weight, d_bias)`.
    pub fn norm(&self) -> f64 {
        self.d_weight.hypot(self.d_bias)
    }

    /// Rescales the gradient so its norm is at most `max_norm`.
    ///
    /// # Returns
    /// The possibly rescaled gradient and whether it was rescaled. A NaN norm never compares
    /// greater than `max_norm`, so a NaN gradient comes back untouched.
    pub fn clip_by_norm(self, max_norm: f64) -> (Self, bool) {
        let norm = self.norm();
        if norm <= max_norm || norm.is_nan() {
            return (self, false);
        }

        let scale = max_norm / norm;
        (self.scaled(scale), true)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            d_weight: self.d_weight * factor,
            d_bias: self.d_bias * factor,
        }
    }
}
