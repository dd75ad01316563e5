use std::{fs::File, io, path::Path};

use csv::ReaderBuilder;
use log::info;
use machine_learning::{Dataset, Summary, shuffle};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Two numeric columns of a housing CSV: one feature and one target.
///
/// Rows keep the order they were read in until [`HousingFrame::shuffle`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingFrame {
    feature: String,
    target: String,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Per-column description of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameSummary {
    pub feature: Summary,
    pub target: Summary,
}

impl HousingFrame {
    /// Loads the `feature` and `target` columns of a headered CSV file.
    ///
    /// # Errors
    /// `Io` if the file cannot be opened, otherwise see [`HousingFrame::from_reader`].
    pub fn from_csv<P: AsRef<Path>>(path: P, feature: &str, target: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let frame = Self::from_reader(io::BufReader::new(file), feature, target)?;

        info!("loaded {} rows from {}", frame.len(), path.display());
        Ok(frame)
    }

    /// Reads the `feature` and `target` columns of a headered CSV.
    ///
    /// # Errors
    /// `MissingColumn` if either column is not in the header, `InvalidValue` if a cell is not
    /// a finite number and `Csv` for malformed records.
    pub fn from_reader<R: io::Read>(reader: R, feature: &str, target: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AppError::MissingColumn(name.to_string()))
        };
        let feature_idx = column(feature)?;
        let target_idx = column(target)?;

        let mut xs = Vec::new();
        let mut ys = Vec::new();

        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = i + 1;

            xs.push(parse_cell(&record, feature_idx, feature, row)?);
            ys.push(parse_cell(&record, target_idx, target, row)?);
        }

        Ok(Self {
            feature: feature.to_string(),
            target: target.to_string(),
            xs,
            ys,
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn feature_name(&self) -> &str {
        &self.feature
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Reorders the rows by a random permutation, keeping each feature with its target.
    pub fn shuffle(&mut self, seed: Option<u64>) {
        let rows: Vec<(f64, f64)> = self.xs.iter().copied().zip(self.ys.iter().copied()).collect();
        (self.xs, self.ys) = shuffle::shuffle(&rows, seed).into_iter().unzip();
    }

    /// Divides every target by `factor`.
    pub fn scale_target(&mut self, factor: f64) {
        self.ys.iter_mut().for_each(|y| *y /= factor);
    }

    /// Describes both columns.
    ///
    /// # Errors
    /// `Ml(EmptyDataset)` if the frame has no rows.
    pub fn describe(&self) -> Result<FrameSummary> {
        Ok(FrameSummary {
            feature: Summary::of(&self.xs)?,
            target: Summary::of(&self.ys)?,
        })
    }

    /// Hands the rows over to the training core.
    ///
    /// # Errors
    /// `Ml(EmptyDataset)` if the frame has no rows.
    pub fn into_dataset(self) -> Result<Dataset> {
        Ok(Dataset::new(self.xs, self.ys)?)
    }
}

fn parse_cell(record: &csv::StringRecord, idx: usize, column: &str, row: usize) -> Result<f64> {
    let raw = record.get(idx).unwrap_or_default();
    let invalid = || AppError::InvalidValue {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    };

    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    Ok(value)
}
