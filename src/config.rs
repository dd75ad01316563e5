use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use machine_learning::TrainerConfig;
use serde::Serialize;

use crate::error::{AppError, Result};

pub const DEFAULT_DATA_PATH: &str = "california_housing_train.csv";
pub const DEFAULT_FEATURE: &str = "total_rooms";
pub const DEFAULT_TARGET: &str = "median_house_value";

/// A randomized stage of a run, each drawing from its own seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The one-off row permutation after loading.
    Rows,
    /// The shuffle window feeding the trainer.
    Batches,
    /// The rows drawn for the regression line.
    Sample,
}

/// Flat process configuration, read from `HOUSING_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub feature: String,
    pub target: String,
    /// Targets are divided by this before training.
    pub target_scale: f64,

    pub learning_rate: f64,
    pub clip_norm: f64,
    pub batch_size: usize,
    pub buffer_size: usize,
    pub steps: usize,
    pub seed: Option<u64>,
    pub halt_on_divergence: bool,
    pub log_every: usize,

    /// Rows drawn for the regression line plot data, `0` skips it.
    pub sample_size: usize,
    pub report_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let trainer = TrainerConfig::default();

        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            feature: DEFAULT_FEATURE.into(),
            target: DEFAULT_TARGET.into(),
            target_scale: 1000.0,
            learning_rate: trainer.learning_rate,
            clip_norm: trainer.clip_norm,
            batch_size: trainer.batch_size,
            buffer_size: trainer.buffer_size,
            steps: trainer.steps,
            seed: trainer.seed,
            halt_on_divergence: trainer.halt_on_divergence,
            log_every: trainer.log_every,
            sample_size: 300,
            report_path: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// `InvalidConfig` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to the defaults for unset keys.
    ///
    /// # Errors
    /// `InvalidConfig` if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let seed = match lookup("HOUSING_SEED") {
            Some(raw) => Some(parse_value("HOUSING_SEED", &raw)?),
            None => d.seed,
        };

        Ok(Self {
            data_path: lookup("HOUSING_DATA").map(PathBuf::from).unwrap_or(d.data_path),
            feature: lookup("HOUSING_FEATURE").unwrap_or(d.feature),
            target: lookup("HOUSING_TARGET").unwrap_or(d.target),
            target_scale: parse_or(&lookup, "HOUSING_TARGET_SCALE", d.target_scale)?,
            learning_rate: parse_or(&lookup, "HOUSING_LEARNING_RATE", d.learning_rate)?,
            clip_norm: parse_or(&lookup, "HOUSING_CLIP_NORM", d.clip_norm)?,
            batch_size: parse_or(&lookup, "HOUSING_BATCH_SIZE", d.batch_size)?,
            buffer_size: parse_or(&lookup, "HOUSING_BUFFER_SIZE", d.buffer_size)?,
            steps: parse_or(&lookup, "HOUSING_STEPS", d.steps)?,
            seed,
            halt_on_divergence: parse_or(
                &lookup,
                "HOUSING_HALT_ON_DIVERGENCE",
                d.halt_on_divergence,
            )?,
            log_every: parse_or(&lookup, "HOUSING_LOG_EVERY", d.log_every)?,
            sample_size: parse_or(&lookup, "HOUSING_SAMPLE_SIZE", d.sample_size)?,
            report_path: lookup("HOUSING_REPORT").map(PathBuf::from),
        })
    }

    /// The training half of the configuration.
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            steps: self.steps,
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
            clip_norm: self.clip_norm,
            shuffle: true,
            buffer_size: self.buffer_size,
            seed: self.stage_seed(Stage::Batches),
            passes: None,
            halt_on_divergence: self.halt_on_divergence,
            log_every: self.log_every,
        }
    }

    /// The seed of `stage`, derived from `seed` so that no two stages share a stream.
    pub fn stage_seed(&self, stage: Stage) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(stage as u64))
    }

    /// Checks every value before any data is read.
    ///
    /// # Errors
    /// `InvalidConfig` for application values, `Ml(InvalidConfig)` for training values.
    pub fn validate(&self) -> Result<()> {
        if self.feature.is_empty() || self.target.is_empty() {
            return Err(AppError::InvalidConfig(
                "feature and target column names must not be empty".into(),
            ));
        }

        if !(self.target_scale.is_finite() && self.target_scale != 0.0) {
            return Err(AppError::InvalidConfig(format!(
                "target_scale must be a finite non-zero number, got {}",
                self.target_scale
            )));
        }

        self.trainer_config().validate()?;
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}
