//! Single-feature linear regression trained by clipped gradient descent.
//!
//! A [`BatchSource`] owns the rows and hands out lazy batch streams, a [`Trainer`] pulls a
//! fixed number of batches through a [`GradientDescent`] optimizer and an [`Evaluator`]
//! replays the rows once through the trained [`LinearModel`].

pub mod batches;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod loss;
pub mod model;
pub mod optimization;
pub mod shuffle;
pub mod stats;
pub mod training;

pub use batches::{BatchConfig, BatchSource, BatchStream, Order, Repeat};
pub use dataset::{Batch, Dataset, Sample};
pub use error::{MlErr, Result};
pub use evaluation::{EvaluationResult, Evaluator};
pub use model::LinearModel;
pub use optimization::{Gradient, GradientDescent, Optimizer};
pub use stats::Summary;
pub use training::{Trainer, TrainerConfig, Training};
