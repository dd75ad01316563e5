use super::{Gradient, Optimizer, Update};
use crate::model::LinearModel;

/// Gradient descent optimization algorithm, with optional gradient norm clipping.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
    clip_norm: Option<f64>,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update`.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            clip_norm: None,
        }
    }

    /// Bounds the norm of every gradient to `clip_norm` before it is applied.
    ///
    /// `clip_norm` must be a positive finite number; `TrainerConfig::validate` rejects
    /// anything else before a trainer builds its optimizer.
    ///
    /// # Panics
    /// In debug builds, if `clip_norm` is not positive and finite.
    pub fn with_clip_norm(mut self, clip_norm: f64) -> Self {
        debug_assert!(
            clip_norm.is_finite() && clip_norm > 0.0,
            "clip_norm must be positive and finite, got {clip_norm}"
        );
        self.clip_norm = Some(clip_norm);
        self
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the (clipped) gradient, with a length of
    /// `learning_rate` times its norm.
    fn update(&mut self, model: &mut LinearModel, grad: Gradient) -> Update {
        let raw_norm = grad.norm();
        let (applied, clipped) = match self.clip_norm {
            Some(max_norm) => grad.clip_by_norm(max_norm),
            None => (grad, false),
        };

        let lr = self.learning_rate;
        model.descend(lr * applied.d_weight, lr * applied.d_bias);

        Update {
            raw_norm,
            clipped,
            applied,
        }
    }
}
