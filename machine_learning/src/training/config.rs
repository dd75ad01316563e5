use crate::{MlErr, Result};

/// The flat set of values that drive a training run.
///
/// The defaults reproduce the housing setup: one-row batches, a tiny learning rate and a
/// gradient norm bounded by 5.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Optimizer steps to take, one batch each.
    pub steps: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub clip_norm: f64,
    pub shuffle: bool,
    /// Rows held by the shuffle window.
    pub buffer_size: usize,
    pub seed: Option<u64>,
    /// Passes over the dataset the batch stream may make; `None` repeats forever.
    pub passes: Option<usize>,
    /// Abort as soon as the parameters stop being finite.
    pub halt_on_divergence: bool,
    /// Log progress every this many steps, `0` only logs the start and the end.
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            batch_size: 1,
            learning_rate: 1e-7,
            clip_norm: 5.0,
            shuffle: true,
            buffer_size: 10_000,
            seed: None,
            passes: None,
            halt_on_divergence: false,
            log_every: 10,
        }
    }
}

impl TrainerConfig {
    /// Checks every value before training starts.
    ///
    /// # Errors
    /// `InvalidConfig` naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(MlErr::InvalidConfig("steps must be greater than 0".into()));
        }

        if self.batch_size == 0 {
            return Err(MlErr::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if !self.learning_rate.is_finite() {
            return Err(MlErr::InvalidConfig(format!(
                "learning_rate must be finite, got {}",
                self.learning_rate
            )));
        }

        if !(self.clip_norm.is_finite() && self.clip_norm > 0.0) {
            return Err(MlErr::InvalidConfig(format!(
                "clip_norm must be a positive finite number, got {}",
                self.clip_norm
            )));
        }

        if self.shuffle && self.buffer_size == 0 {
            return Err(MlErr::InvalidConfig(
                "buffer_size must be greater than 0 when shuffling".into(),
            ));
        }

        if self.passes == Some(0) {
            return Err(MlErr::InvalidConfig(
                "passes must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(config: TrainerConfig, needle: &str) {
        match config.validate() {
            Err(MlErr::InvalidConfig(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected InvalidConfig mentioning {needle}, got {other:?}"),
        }
    }

    #[test]
    fn default_is_valid() {
        assert_eq!(TrainerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = TrainerConfig::default();

        rejects(TrainerConfig { steps: 0, ..base.clone() }, "steps");
        rejects(TrainerConfig { batch_size: 0, ..base.clone() }, "batch_size");
        rejects(
            TrainerConfig { learning_rate: f64::NAN, ..base.clone() },
            "learning_rate",
        );
        rejects(
            TrainerConfig { learning_rate: f64::INFINITY, ..base.clone() },
            "learning_rate",
        );
        rejects(TrainerConfig { clip_norm: 0.0, ..base.clone() }, "clip_norm");
        rejects(TrainerConfig { buffer_size: 0, ..base.clone() }, "buffer_size");
        rejects(TrainerConfig { passes: Some(0), ..base }, "passes");
    }

    #[test]
    fn buffer_size_is_ignored_without_shuffle() {
        let config = TrainerConfig {
            shuffle: false,
            buffer_size: 0,
            ..TrainerConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }
}
