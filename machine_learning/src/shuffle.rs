use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Decides the order in which the rows of a dataset are visited during one pass.
///
/// Implementations are asked once per pass, so a randomized strategy re-permutes the rows
/// independently every time the dataset is exhausted.
pub trait Shuffle {
    /// Writes the visiting order of one pass over `len` rows into `order`.
    ///
    /// The written order must be a permutation of `0..len`.
    fn arrange(&mut self, order: &mut Vec<usize>, len: usize);
}

impl<T: Shuffle + ?Sized> Shuffle for Box<T> {
    fn arrange(&mut self, order: &mut Vec<usize>, len: usize) {
        (**self).arrange(order, len)
    }
}

/// Visits the rows in their stored order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl Shuffle for Sequential {
    fn arrange(&mut self, order: &mut Vec<usize>, len: usize) {
        order.clear();
        order.extend(0..len);
    }
}

/// Shuffles through a bounded window of rows.
///
/// Rows enter the window in stored order; each output slot is drawn uniformly from the window
/// and refilled with the next incoming row. A window at least as large as the dataset yields a
/// uniform permutation, smaller windows only mix rows that are close to each other.
#[derive(Debug, Clone)]
pub struct WindowShuffle {
    buffer_size: NonZeroUsize,
    rng: StdRng,
}

impl WindowShuffle {
    /// Creates a new `WindowShuffle`.
    ///
    /// # Arguments
    /// * `buffer_size` - The amount of rows the window holds at once.
    /// * `seed` - An optional seed, without it every run visits the rows in a different order.
    pub fn new(buffer_size: NonZeroUsize, seed: Option<u64>) -> Self {
        Self {
            buffer_size,
            rng: generate_rng(seed),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size.get()
    }
}

impl Shuffle for WindowShuffle {
    fn arrange(&mut self, order: &mut Vec<usize>, len: usize) {
        order.clear();
        order.reserve(len);

        let mut incoming = 0..len;
        let mut window: Vec<usize> = incoming.by_ref().take(self.buffer_size.get()).collect();

        while !window.is_empty() {
            let pick = self.rng.random_range(0..window.len());
            let row = match incoming.next() {
                Some(next) => std::mem::replace(&mut window[pick], next),
                None => window.swap_remove(pick),
            };

            order.push(row);
        }
    }
}

/// Returns a copy of `rows` reordered by a full random permutation drawn from `seed`.
pub fn shuffle<T: Clone>(rows: &[T], seed: Option<u64>) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.shuffle(&mut generate_rng(seed));
    rows
}

/// Generates a random number generator given (or not) a seed.
///
/// # Arguments
/// * `seed` - An optional seed for the rng.
pub fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut order: Vec<usize>) -> Vec<usize> {
        order.sort_unstable();
        order
    }

    #[test]
    fn sequential_keeps_stored_order() {
        let mut order = vec![7, 7, 7];
        Sequential.arrange(&mut order, 4);
        assert_eq!(order, [0, 1, 2, 3]);
    }

    #[test]
    fn window_shuffle_is_a_permutation_for_any_buffer_size() {
        for buffer in [1, 2, 5, 16, 100] {
            let mut shuffle = WindowShuffle::new(NonZeroUsize::new(buffer).unwrap(), Some(3));
            let mut order = Vec::new();
            shuffle.arrange(&mut order, 16);

            assert_eq!(sorted(order), (0..16).collect::<Vec<_>>(), "buffer {buffer}");
        }
    }

    #[test]
    fn window_of_one_does_not_reorder() {
        let mut shuffle = WindowShuffle::new(NonZeroUsize::MIN, None);
        let mut order = Vec::new();
        shuffle.arrange(&mut order, 6);
        assert_eq!(order, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn same_seed_same_order() {
        let buffer = NonZeroUsize::new(8).unwrap();
        let mut a = WindowShuffle::new(buffer, Some(42));
        let mut b = WindowShuffle::new(buffer, Some(42));

        let (mut oa, mut ob) = (Vec::new(), Vec::new());
        for _ in 0..3 {
            a.arrange(&mut oa, 50);
            b.arrange(&mut ob, 50);
            assert_eq!(oa, ob);
        }
    }

    #[test]
    fn consecutive_passes_are_permuted_independently() {
        let mut shuffle = WindowShuffle::new(NonZeroUsize::new(64).unwrap(), Some(11));
        let (mut first, mut second) = (Vec::new(), Vec::new());
        shuffle.arrange(&mut first, 64);
        shuffle.arrange(&mut second, 64);

        assert_ne!(first, second);
        assert_eq!(sorted(first), sorted(second));
    }

    #[test]
    fn shuffle_keeps_every_row() {
        let rows: Vec<u32> = (0..100).collect();
        let shuffled = shuffle(&rows, Some(5));

        assert_ne!(shuffled, rows);
        let mut back = shuffled.clone();
        back.sort_unstable();
        assert_eq!(back, rows);
        assert_eq!(shuffle(&rows, Some(5)), shuffled);
    }
}
