use crate::{MlErr, Result};

/// A single supervised sample `(x, y)`: one feature and its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// An immutable in-memory table of `(feature, target)` rows.
///
/// Invariants, checked once by the constructor:
/// - at least one row,
/// - `xs` and `ys` have the same length and are paired by index,
/// - every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Dataset {
    /// Creates a new dataset from owned feature and target columns.
    ///
    /// # Arguments
    /// * `xs` - The feature column.
    /// * `ys` - The target column, paired with `xs` by index.
    ///
    /// # Errors
    /// `SizeMismatch` if the columns differ in length, `EmptyDataset` if they are empty and
    /// `NonFiniteValue` if any value is NaN or infinite.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(MlErr::SizeMismatch {
                what: "targets",
                got: ys.len(),
                expected: xs.len(),
            });
        }

        if xs.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        if let Some(index) = xs.iter().position(|x| !x.is_finite()) {
            return Err(MlErr::NonFiniteValue {
                what: "feature",
                index,
            });
        }

        if let Some(index) = ys.iter().position(|y| !y.is_finite()) {
            return Err(MlErr::NonFiniteValue {
                what: "target",
                index,
            });
        }

        Ok(Self { xs, ys })
    }

    /// Builds a dataset from `(feature, target)` pairs.
    pub fn from_pairs<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (xs, ys) = rows.into_iter().unzip();
        Self::new(xs, ys)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Returns the sample at `idx`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Sample> {
        Some(Sample {
            x: *self.xs.get(idx)?,
            y: self.ys[idx],
        })
    }

    #[inline]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[inline]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Gathers the rows at `indices` into an owned batch, keeping their order.
    pub(crate) fn gather(&self, indices: &[usize]) -> Batch {
        let xs = indices.iter().map(|&i| self.xs[i]).collect();
        let ys = indices.iter().map(|&i| self.ys[i]).collect();
        Batch { xs, ys }
    }
}

/// An owned group of rows processed together in one optimizer step.
///
/// Only the last batch of a pass may be shorter than the configured size.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Batch {
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Iterates the rows of this batch in order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| Sample { x, y })
    }
}
