use std::num::NonZeroUsize;

use log::{debug, info, warn};
use serde::Serialize;

use super::TrainerConfig;
use crate::{
    MlErr, Result,
    batches::{BatchConfig, BatchSource, Order, Repeat},
    dataset::Batch,
    loss::{LossFn, Mse},
    model::LinearModel,
    optimization::{GradientDescent, Optimizer},
};

/// The outcome of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Training {
    model: LinearModel,
    losses: Vec<f64>,
    clipped_steps: usize,
}

impl Training {
    /// The trained model.
    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn into_model(self) -> LinearModel {
        self.model
    }

    /// The batch loss measured before each step, in step order.
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn steps(&self) -> usize {
        self.losses.len()
    }

    /// The amount of steps whose gradient had to be rescaled.
    pub fn clipped_steps(&self) -> usize {
        self.clipped_steps
    }
}

/// Drives a batch stream through an optimizer for a fixed number of steps.
///
/// A run has a single state, advancing one step per batch pulled, and ends once `steps`
/// batches have been consumed.
pub struct Trainer<O = GradientDescent, L = Mse>
where
    O: Optimizer,
    L: LossFn,
{
    optimizer: O,
    loss_fn: L,
    batches: BatchConfig,

    steps: NonZeroUsize,
    halt_on_divergence: bool,
    log_every: usize,
}

impl Trainer {
    /// Returns a new clipped gradient descent `Trainer` on mean squared error.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` does not validate.
    pub fn new(config: &TrainerConfig) -> Result<Self> {
        config.validate()?;

        let optimizer =
            GradientDescent::new(config.learning_rate).with_clip_norm(config.clip_norm);
        Self::with_parts(config, optimizer, Mse::new())
    }
}

impl<O, L> Trainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `Trainer` with a custom optimizer and loss function.
    ///
    /// The optimizer related values of `config` (learning rate, clip norm) are left to the
    /// given `optimizer`.
    ///
    /// # Errors
    /// `InvalidConfig` if the step count, batch size, buffer size or pass limit is invalid.
    pub fn with_parts(config: &TrainerConfig, optimizer: O, loss_fn: L) -> Result<Self> {
        let steps = NonZeroUsize::new(config.steps)
            .ok_or_else(|| MlErr::InvalidConfig("steps must be greater than 0".into()))?;

        let order = if config.shuffle {
            let buffer_size = NonZeroUsize::new(config.buffer_size).ok_or_else(|| {
                MlErr::InvalidConfig("buffer_size must be greater than 0 when shuffling".into())
            })?;

            Order::Shuffled {
                buffer_size,
                seed: config.seed,
            }
        } else {
            Order::Stored
        };

        let repeat = match config.passes {
            Some(passes) => Repeat::Passes(
                NonZeroUsize::new(passes)
                    .ok_or_else(|| MlErr::InvalidConfig("passes must be greater than 0".into()))?,
            ),
            None => Repeat::Forever,
        };

        Ok(Self {
            optimizer,
            loss_fn,
            batches: BatchConfig::new(config.batch_size, order, repeat)?,
            steps,
            halt_on_divergence: config.halt_on_divergence,
            log_every: config.log_every,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps.get()
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.batches
    }

    /// Trains `model` on a fresh stream drawn from `source`.
    ///
    /// # Errors
    /// `InsufficientData` if the stream is bounded and ends before the configured steps are
    /// taken, `Diverged` if the divergence guard trips.
    pub fn train(&mut self, source: &BatchSource, model: LinearModel) -> Result<Training> {
        info!(
            "training on {} rows: steps={} batch_size={}",
            source.len(),
            self.steps,
            self.batches.batch_size()
        );

        let stream = source.configure(&self.batches);
        let training = self.fit(stream, model, self.steps.get())?;

        info!(
            "training finished: weight={} bias={} clipped_steps={}",
            training.model.weight(),
            training.model.bias(),
            training.clipped_steps
        );

        Ok(training)
    }

    /// Takes exactly `steps` optimizer steps on the first batches of `batches`.
    ///
    /// Zero steps hand `model` back untouched.
    ///
    /// # Errors
    /// `InsufficientData` if `batches` ends early, `Diverged` if the divergence guard trips.
    pub fn fit<I>(&mut self, batches: I, mut model: LinearModel, steps: usize) -> Result<Training>
    where
        I: IntoIterator<Item = Batch>,
    {
        let mut batches = batches.into_iter();
        let mut losses = Vec::with_capacity(steps);
        let mut clipped_steps = 0;

        for step in 1..=steps {
            let Some(batch) = batches.next() else {
                return Err(MlErr::InsufficientData {
                    requested: steps,
                    produced: step - 1,
                });
            };

            let stats = self.optimizer.step(&self.loss_fn, &mut model, &batch);
            losses.push(stats.loss);
            clipped_steps += usize::from(stats.clipped);

            if self.log_every > 0 && step % self.log_every == 0 {
                debug!(
                    step = step,
                    loss = stats.loss,
                    grad_norm = stats.grad_norm,
                    clipped = stats.clipped;
                    "training step"
                );
            }

            if self.halt_on_divergence && !model.is_finite() {
                return Err(MlErr::Diverged {
                    step,
                    weight: model.weight(),
                    bias: model.bias(),
                });
            }
        }

        if !model.is_finite() {
            warn!(
                "parameters are not finite after training: weight={} bias={}",
                model.weight(),
                model.bias()
            );
        }

        Ok(Training {
            model,
            losses,
            clipped_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::Dataset,
        optimization::{Gradient, Update},
    };

    fn source(rows: &[(f64, f64)]) -> BatchSource {
        BatchSource::new(Dataset::from_pairs(rows.iter().copied()).unwrap())
    }

    fn unshuffled(steps: usize, batch_size: usize) -> TrainerConfig {
        TrainerConfig {
            steps,
            batch_size,
            learning_rate: 0.01,
            clip_norm: 5.0,
            shuffle: false,
            log_every: 1,
            ..TrainerConfig::default()
        }
    }

    /// Counts calls and leaves the model alone.
    #[derive(Default)]
    struct Counting {
        calls: usize,
    }

    impl Optimizer for Counting {
        fn update(&mut self, _model: &mut LinearModel, grad: Gradient) -> Update {
            self.calls += 1;
            Update {
                raw_norm: grad.norm(),
                clipped: false,
                applied: grad,
            }
        }
    }

    #[test]
    fn invalid_config_fails_before_training() {
        let config = TrainerConfig {
            learning_rate: f64::NAN,
            ..TrainerConfig::default()
        };
        assert!(matches!(Trainer::new(&config), Err(MlErr::InvalidConfig(_))));
    }

    #[test]
    fn consumes_exactly_the_configured_steps() {
        let src = source(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let config = unshuffled(7, 2);
        let mut trainer = Trainer::with_parts(&config, Counting::default(), Mse).unwrap();

        let training = trainer.train(&src, LinearModel::zeros()).unwrap();

        assert_eq!(trainer.optimizer.calls, 7);
        assert_eq!(training.steps(), 7);
        assert_eq!(training.model(), &LinearModel::zeros());
    }

    #[test]
    fn single_full_batch_step_matches_closed_form() {
        let src = source(&[(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]);
        let mut trainer = Trainer::new(&unshuffled(1, 3)).unwrap();

        let training = trainer.train(&src, LinearModel::zeros()).unwrap();

        // gradient (-68/3, -10), norm > 5, rescaled to norm 5 then scaled by lr
        let norm = (68.0_f64 / 3.0).hypot(10.0);
        let weight = 0.01 * 5.0 * (68.0 / 3.0) / norm;
        let bias = 0.01 * 5.0 * 10.0 / norm;

        assert!((training.model().weight() - weight).abs() < 1e-12);
        assert!((training.model().bias() - bias).abs() < 1e-12);
        assert_eq!(training.clipped_steps(), 1);
        assert!((training.losses()[0] - 83.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn bounded_stream_reports_insufficient_data() {
        let src = source(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let config = TrainerConfig {
            passes: Some(2),
            ..unshuffled(10, 2)
        };
        let mut trainer = Trainer::new(&config).unwrap();

        let err = trainer.train(&src, LinearModel::zeros()).unwrap_err();
        assert_eq!(
            err,
            MlErr::InsufficientData {
                requested: 10,
                produced: 4
            }
        );
    }

    #[test]
    fn zero_steps_leave_the_model_untouched() {
        let src = source(&[(1.0, 3.0), (2.0, 5.0)]);
        let mut trainer = Trainer::new(&unshuffled(1, 1)).unwrap();
        let initial = LinearModel::new(0.5, -0.25);

        let stream = src.configure(trainer.batch_config());
        let training = trainer.fit(stream, initial, 0).unwrap();

        assert_eq!(training.model(), &initial);
        assert!(training.losses().is_empty());
    }

    #[test]
    fn divergence_guard_stops_at_the_first_non_finite_step() {
        let src = source(&[(1e300, 1.0), (2e300, 2.0)]);
        let config = TrainerConfig {
            learning_rate: 1.0,
            halt_on_divergence: true,
            ..unshuffled(5, 2)
        };
        let mut trainer = Trainer::new(&config).unwrap();

        let err = trainer.train(&src, LinearModel::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, MlErr::Diverged { step: 1, .. }), "{err:?}");
    }

    #[test]
    fn without_the_guard_non_finite_parameters_propagate() {
        let src = source(&[(1e300, 1.0), (2e300, 2.0)]);
        let config = TrainerConfig {
            learning_rate: 1.0,
            ..unshuffled(3, 2)
        };
        let mut trainer = Trainer::new(&config).unwrap();

        let training = trainer.train(&src, LinearModel::new(1.0, 0.0)).unwrap();
        assert!(!training.model().is_finite());
    }

    #[test]
    fn seeded_shuffled_runs_are_reproducible() {
        let rows: Vec<_> = (0..40).map(|i| (i as f64, 3.0 * i as f64 - 2.0)).collect();
        let src = source(&rows);
        let config = TrainerConfig {
            steps: 60,
            batch_size: 4,
            learning_rate: 1e-3,
            buffer_size: 16,
            seed: Some(2024),
            ..TrainerConfig::default()
        };

        let a = train_with(&src, &config);
        let b = train_with(&src, &config);
        assert_eq!(a, b);
    }

    fn train_with(src: &BatchSource, config: &TrainerConfig) -> Training {
        Trainer::new(config)
            .unwrap()
            .train(src, LinearModel::zeros())
            .unwrap()
    }
}
