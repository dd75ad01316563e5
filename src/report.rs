use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::{info, warn};
use machine_learning::{Dataset, EvaluationResult, LinearModel, Summary, Training, shuffle};
use rand::seq::index;
use serde::Serialize;

use crate::{
    config::{AppConfig, Stage},
    error::Result,
    loader::FrameSummary,
};

/// Everything a run produced, ready to be printed or written out as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub config: AppConfig,
    pub data: FrameSummary,
    pub model: LinearModel,
    pub training: TrainingSummary,
    pub mse: f64,
    pub rmse: f64,
    pub target_min: f64,
    pub target_max: f64,
    /// `target_max - target_min`, the scale to read the RMSE against.
    pub target_range: f64,
    pub calibration: Calibration,
    pub line: Option<RegressionLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub steps: usize,
    pub clipped_steps: usize,
    pub first_loss: Option<f64>,
    pub final_loss: Option<f64>,
}

/// Side by side description of predictions and targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    pub predictions: Summary,
    pub targets: Summary,
}

/// The learned line between the smallest and largest feature of a row sample, plus the
/// sampled rows themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionLine {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub points: Vec<(f64, f64)>,
}

impl RegressionLine {
    /// Draws `size` distinct rows of `dataset` and spans `model` across their feature range.
    ///
    /// Returns `None` when `size` is zero or the dataset is empty. Sizes beyond the row count
    /// are clamped.
    pub fn sample(
        dataset: &Dataset,
        model: &LinearModel,
        size: usize,
        seed: Option<u64>,
    ) -> Option<Self> {
        if size == 0 || dataset.is_empty() {
            return None;
        }

        let amount = if size > dataset.len() {
            warn!(
                "sample size {size} exceeds the {} available rows, using all of them",
                dataset.len()
            );
            dataset.len()
        } else {
            size
        };

        let mut rng = shuffle::generate_rng(seed);
        let points: Vec<(f64, f64)> = index::sample(&mut rng, dataset.len(), amount)
            .into_iter()
            .map(|i| (dataset.xs()[i], dataset.ys()[i]))
            .collect();

        let (x0, x1) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });

        Some(Self {
            x0,
            y0: model.predict(x0),
            x1,
            y1: model.predict(x1),
            points,
        })
    }
}

impl Report {
    /// Gathers the results of a run over `dataset`.
    ///
    /// # Errors
    /// `Ml(EmptyDataset)` if there is nothing to describe.
    pub fn build(
        config: &AppConfig,
        data: FrameSummary,
        dataset: &Dataset,
        training: &Training,
        evaluation: &EvaluationResult,
    ) -> Result<Self> {
        let model = *training.model();
        let targets = Summary::of(dataset.ys())?;

        let calibration = Calibration {
            predictions: Summary::of(evaluation.predictions())?,
            targets,
        };

        Ok(Self {
            config: config.clone(),
            data,
            model,
            training: TrainingSummary {
                steps: training.steps(),
                clipped_steps: training.clipped_steps(),
                first_loss: training.losses().first().copied(),
                final_loss: training.losses().last().copied(),
            },
            mse: evaluation.mse(),
            rmse: evaluation.rmse(),
            target_min: targets.min,
            target_max: targets.max,
            target_range: targets.range(),
            calibration,
            line: RegressionLine::sample(
                dataset,
                &model,
                config.sample_size,
                config.stage_seed(Stage::Sample),
            ),
        })
    }

    /// Writes a human readable summary to `out`.
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "feature: {}  target: {}", self.config.feature, self.config.target)?;
        writeln!(out, "weight: {:.6}  bias: {:.6}", self.model.weight(), self.model.bias())?;
        writeln!(
            out,
            "steps: {}  clipped: {}  final batch loss: {}",
            self.training.steps,
            self.training.clipped_steps,
            fmt_opt(self.training.final_loss)
        )?;
        writeln!(out)?;
        writeln!(out, "mean squared error (on training data): {:.3}", self.mse)?;
        writeln!(out, "root mean squared error (on training data): {:.3}", self.rmse)?;
        writeln!(out, "min. target: {:.3}", self.target_min)?;
        writeln!(out, "max. target: {:.3}", self.target_max)?;
        writeln!(out, "difference between min. and max.: {:.3}", self.target_range)?;
        writeln!(out)?;

        writeln!(out, "{:>8} {:>14} {:>14}", "", "predictions", "targets")?;
        let (p, t) = (&self.calibration.predictions, &self.calibration.targets);
        for (name, a, b) in [
            ("count", p.count as f64, t.count as f64),
            ("mean", p.mean, t.mean),
            ("std", p.std, t.std),
            ("min", p.min, t.min),
            ("25%", p.p25, t.p25),
            ("50%", p.p50, t.p50),
            ("75%", p.p75, t.p75),
            ("max", p.max, t.max),
        ] {
            writeln!(out, "{name:>8} {a:>14.3} {b:>14.3}")?;
        }

        if let Some(line) = &self.line {
            writeln!(out)?;
            writeln!(
                out,
                "regression line over {} sampled rows: ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                line.points.len(),
                line.x0,
                line.y0,
                line.x1,
                line.y1
            )?;
        }

        Ok(())
    }

    /// Writes the report as pretty printed JSON to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);

        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;

        info!("report written to {}", path.display());
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}
