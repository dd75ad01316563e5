use std::num::NonZeroUsize;

use crate::{
    MlErr, Result,
    dataset::{Batch, Dataset},
    shuffle::{Sequential, Shuffle, WindowShuffle},
};

/// How many full passes over the dataset a stream makes before it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Passes(NonZeroUsize),
    /// Never ends; the consumer bounds how many batches it pulls.
    Forever,
}

impl Repeat {
    /// A single pass.
    pub fn once() -> Self {
        Self::Passes(NonZeroUsize::MIN)
    }
}

/// The order rows are visited in within each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Stored,
    Shuffled {
        buffer_size: NonZeroUsize,
        seed: Option<u64>,
    },
}

/// A validated batching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    batch_size: NonZeroUsize,
    order: Order,
    repeat: Repeat,
}

impl BatchConfig {
    /// Returns a new `BatchConfig`.
    ///
    /// # Errors
    /// `InvalidConfig` if `batch_size` is zero.
    pub fn new(batch_size: usize, order: Order, repeat: Repeat) -> Result<Self> {
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| MlErr::InvalidConfig("batch_size must be greater than 0".into()))?;

        Ok(Self {
            batch_size,
            order,
            repeat,
        })
    }

    /// Shuffled batches that repeat forever, as used for training.
    ///
    /// # Errors
    /// `InvalidConfig` if `batch_size` or `buffer_size` is zero.
    pub fn training(batch_size: usize, buffer_size: usize, seed: Option<u64>) -> Result<Self> {
        let buffer_size = NonZeroUsize::new(buffer_size)
            .ok_or_else(|| MlErr::InvalidConfig("buffer_size must be greater than 0".into()))?;

        Self::new(
            batch_size,
            Order::Shuffled { buffer_size, seed },
            Repeat::Forever,
        )
    }

    /// A single pass in stored order, as used for evaluation.
    ///
    /// # Errors
    /// `InvalidConfig` if `batch_size` is zero.
    pub fn single_pass(batch_size: usize) -> Result<Self> {
        Self::new(batch_size, Order::Stored, Repeat::once())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }
}

/// Owns a dataset and hands out lazy batch streams over it.
///
/// The same source serves any number of streams, so training and evaluation can be configured
/// independently without handing the dataset around again.
#[derive(Debug, Clone)]
pub struct BatchSource {
    dataset: Dataset,
}

impl BatchSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Creates a fresh stream following `config`.
    ///
    /// Every call starts over from the first pass; a shuffled config without a seed draws a new
    /// order each time.
    pub fn configure(&self, config: &BatchConfig) -> BatchStream<'_, Box<dyn Shuffle>> {
        let shuffle: Box<dyn Shuffle> = match config.order {
            Order::Stored => Box::new(Sequential),
            Order::Shuffled { buffer_size, seed } => Box::new(WindowShuffle::new(buffer_size, seed)),
        };

        self.stream(config.batch_size, shuffle, config.repeat)
    }

    /// Creates a stream with an explicit shuffle strategy.
    pub fn stream<S: Shuffle>(
        &self,
        batch_size: NonZeroUsize,
        shuffle: S,
        repeat: Repeat,
    ) -> BatchStream<'_, S> {
        BatchStream {
            dataset: &self.dataset,
            shuffle,
            batch_size: batch_size.get(),
            repeat,
            passes: 0,
            order: Vec::with_capacity(self.dataset.len()),
            cursor: 0,
        }
    }
}

/// A lazy, possibly infinite, sequence of batches.
///
/// Batches never straddle two passes: the last batch of a pass holds whatever rows are left.
pub struct BatchStream<'a, S> {
    dataset: &'a Dataset,
    shuffle: S,
    batch_size: usize,
    repeat: Repeat,

    /// Passes started so far.
    passes: usize,
    order: Vec<usize>,
    cursor: usize,
}

impl<S> BatchStream<'_, S> {
    /// Returns the number of passes started so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn exhausted(&self) -> bool {
        match self.repeat {
            Repeat::Passes(limit) => self.passes >= limit.get(),
            Repeat::Forever => false,
        }
    }
}

impl<S: Shuffle> Iterator for BatchStream<'_, S> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            if self.exhausted() {
                return None;
            }

            self.shuffle.arrange(&mut self.order, self.dataset.len());
            self.passes += 1;
            self.cursor = 0;
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.dataset.gather(&self.order[self.cursor..end]);
        self.cursor = end;

        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Repeat::Passes(limit) = self.repeat else {
            return (usize::MAX, None);
        };

        let per_pass = self.dataset.len().div_ceil(self.batch_size);
        let left_in_pass = (self.order.len() - self.cursor).div_ceil(self.batch_size);
        let left = (limit.get() - self.passes)
            .checked_mul(per_pass)
            .and_then(|rest| rest.checked_add(left_in_pass));

        match left {
            Some(left) => (left, Some(left)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(n: usize) -> BatchSource {
        let xs = (0..n).map(|i| i as f64).collect();
        let ys = (0..n).map(|i| i as f64 + 100.0).collect();
        BatchSource::new(Dataset::new(xs, ys).unwrap())
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(matches!(
            BatchConfig::single_pass(0),
            Err(MlErr::InvalidConfig(_))
        ));
        assert!(matches!(
            BatchConfig::training(0, 10, None),
            Err(MlErr::InvalidConfig(_))
        ));
        assert!(matches!(
            BatchConfig::training(1, 0, None),
            Err(MlErr::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_pass_respects_batch_size_and_ends() {
        let src = source(5);
        let cfg = BatchConfig::single_pass(2).unwrap();
        let mut stream = src.configure(&cfg);

        assert_eq!(stream.size_hint(), (3, Some(3)));

        let b1 = stream.next().unwrap();
        assert_eq!(b1.xs, [0.0, 1.0]);
        assert_eq!(b1.ys, [100.0, 101.0]);

        let b2 = stream.next().unwrap();
        assert_eq!(b2.xs, [2.0, 3.0]);

        let b3 = stream.next().unwrap();
        assert_eq!(b3.xs, [4.0]);
        assert_eq!(b3.ys, [104.0]);

        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
        assert_eq!(stream.passes(), 1);
    }

    #[test]
    fn batch_larger_than_dataset_yields_one_batch_per_pass() {
        let src = source(3);
        let cfg = BatchConfig::new(10, Order::Stored, Repeat::Passes(NonZeroUsize::new(2).unwrap()))
            .unwrap();

        let lens: Vec<_> = src.configure(&cfg).map(|b| b.len()).collect();
        assert_eq!(lens, [3, 3]);
    }

    #[test]
    fn finite_repeat_stops_after_the_limit() {
        let src = source(4);
        let cfg = BatchConfig::new(3, Order::Stored, Repeat::Passes(NonZeroUsize::new(3).unwrap()))
            .unwrap();

        let stream = src.configure(&cfg);
        assert_eq!(stream.size_hint(), (6, Some(6)));

        let lens: Vec<_> = stream.map(|b| b.len()).collect();
        assert_eq!(lens, [3, 1, 3, 1, 3, 1]);
    }

    #[test]
    fn huge_pass_limit_does_not_overflow_the_size_hint() {
        let src = source(2);
        let cfg = BatchConfig::new(1, Order::Stored, Repeat::Passes(NonZeroUsize::MAX)).unwrap();

        let stream = src.configure(&cfg);
        assert_eq!(stream.size_hint(), (usize::MAX, None));

        let rows: Vec<f64> = stream.take(3).flat_map(|b| b.xs).collect();
        assert_eq!(rows, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn forever_keeps_producing() {
        let src = source(3);
        let cfg = BatchConfig::training(2, 3, Some(1)).unwrap();
        let mut stream = src.configure(&cfg);

        assert_eq!(stream.size_hint(), (usize::MAX, None));
        let pulled = stream.by_ref().take(1000).count();
        assert_eq!(pulled, 1000);
        assert_eq!(stream.passes(), 500);
    }

    #[test]
    fn one_source_serves_training_and_evaluation_streams() {
        let src = source(6);
        let train = BatchConfig::training(4, 6, Some(9)).unwrap();
        let eval = BatchConfig::single_pass(4).unwrap();

        let _ = src.configure(&train).take(7).count();
        let rows: Vec<f64> = src.configure(&eval).flat_map(|b| b.xs).collect();
        assert_eq!(rows, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn explicit_strategy_is_used() {
        struct Reversed;

        impl Shuffle for Reversed {
            fn arrange(&mut self, order: &mut Vec<usize>, len: usize) {
                order.clear();
                order.extend((0..len).rev());
            }
        }

        let src = source(3);
        let rows: Vec<f64> = src
            .stream(NonZeroUsize::MIN, Reversed, Repeat::once())
            .flat_map(|b| b.xs)
            .collect();
        assert_eq!(rows, [2.0, 1.0, 0.0]);
    }
}
