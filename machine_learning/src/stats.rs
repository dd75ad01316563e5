use serde::Serialize;

use crate::{MlErr, Result};

/// Descriptive statistics of a column of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), `0` for a single value.
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    /// Describes `values`.
    ///
    /// # Errors
    /// `EmptyDataset` if `values` is empty.
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Ok(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    /// `max - min`.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Linear interpolation between the closest ranks of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_small_column() {
        let s = Summary::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();

        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert!((s.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.p25, 1.75);
        assert_eq!(s.p50, 2.5);
        assert_eq!(s.p75, 3.25);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.range(), 3.0);
    }

    #[test]
    fn single_value() {
        let s = Summary::of(&[7.0]).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!((s.min, s.p50, s.max), (7.0, 7.0, 7.0));
    }

    #[test]
    fn empty_is_an_error() {
        assert_eq!(Summary::of(&[]), Err(MlErr::EmptyDataset));
    }
}
