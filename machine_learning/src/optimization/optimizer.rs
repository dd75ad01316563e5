use super::Gradient;
use crate::{dataset::Batch, loss::LossFn, model::LinearModel};

/// What an optimizer did with a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Update {
    /// Norm of the gradient before any clipping.
    pub raw_norm: f64,
    pub clipped: bool,
    /// The gradient that was actually applied.
    pub applied: Gradient,
}

/// Statistics produced by a single optimizer step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub loss: f64,
    pub grad_norm: f64,
    pub clipped: bool,
    pub samples: usize,
}

pub trait Optimizer {
    /// Updates the model's parameters from `grad` according to the algorithm's learning rule.
    fn update(&mut self, model: &mut LinearModel, grad: Gradient) -> Update;

    /// Computes the gradient of `loss_fn` over `batch` and applies it to `model`.
    fn step<L: LossFn>(&mut self, loss_fn: &L, model: &mut LinearModel, batch: &Batch) -> StepStats
    where
        Self: Sized,
    {
        let (loss, grad) = Gradient::compute(loss_fn, model, batch);
        let update = self.update(model, grad);

        StepStats {
            loss,
            grad_norm: update.raw_norm,
            clipped: update.clipped,
            samples: batch.len(),
        }
    }
}
