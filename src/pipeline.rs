use log::debug;
use machine_learning::{BatchSource, Evaluator, LinearModel, Trainer};

use crate::{
    config::{AppConfig, Stage},
    error::Result,
    loader::HousingFrame,
    report::Report,
};

/// Loads the data named by `config`, trains on it and evaluates the result.
///
/// The configuration is validated before the file is touched.
///
/// # Errors
/// Any configuration, loading, training or evaluation error, in the order they can occur.
pub fn run(config: &AppConfig) -> Result<Report> {
    config.validate()?;
    let frame = HousingFrame::from_csv(&config.data_path, &config.feature, &config.target)?;
    run_frame(config, frame)
}

/// Same as [`run`] on rows that were already loaded.
///
/// # Errors
/// Any configuration, training or evaluation error.
pub fn run_frame(config: &AppConfig, mut frame: HousingFrame) -> Result<Report> {
    config.validate()?;
    let trainer_config = config.trainer_config();
    let mut trainer = Trainer::new(&trainer_config)?;

    frame.shuffle(config.stage_seed(Stage::Rows));
    frame.scale_target(config.target_scale);

    let data = frame.describe()?;
    debug!(
        rows = data.feature.count,
        feature_mean = data.feature.mean,
        target_mean = data.target.mean;
        "data described"
    );

    let source = BatchSource::new(frame.into_dataset()?);
    let training = trainer.train(&source, LinearModel::zeros())?;

    let evaluation = Evaluator::new(config.batch_size)?.evaluate(&source, training.model())?;

    Report::build(config, data, source.dataset(), &training, &evaluation)
}
