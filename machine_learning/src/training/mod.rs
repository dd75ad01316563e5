mod config;
mod trainer;

pub use config::TrainerConfig;
pub use trainer::{Trainer, Training};

use crate::{Result, batches::BatchSource, model::LinearModel};

/// Trains a zero-initialized `LinearModel` on `source` following `config`.
///
/// # Errors
/// `InvalidConfig` before any step runs if `config` is invalid, `InsufficientData` if a bounded
/// stream runs out first and `Diverged` if the divergence guard is on and trips.
pub fn train(source: &BatchSource, config: &TrainerConfig) -> Result<Training> {
    Trainer::new(config)?.train(source, LinearModel::zeros())
}
