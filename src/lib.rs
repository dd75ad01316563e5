//! Predicts housing values from a single feature with a linear model.
//!
//! [`pipeline::run`] reads an [`AppConfig`], loads the CSV into a [`HousingFrame`], trains
//! with the `machine_learning` core and returns a [`Report`].

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;

pub use config::{AppConfig, Stage};
pub use error::{AppError, Result};
pub use loader::{FrameSummary, HousingFrame};
pub use report::{Calibration, RegressionLine, Report, TrainingSummary};
