use ndarray::{Array1, ArrayView1};

pub trait LossFn {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;
    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64>;
}

/// Mean squared error loss function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        (&y_pred - &y)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or_default()
    }

    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        (&y_pred - &y) * (2.0 / y_pred.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mse_of_known_residuals() {
        let y_pred = array![1.0, 2.0, 3.0];
        let y = array![2.0, 2.0, 1.0];
        // residuals -1, 0, 2
        assert!((Mse.loss(y_pred.view(), y.view()) - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mse_prime_is_scaled_residual() {
        let y_pred = array![1.0, 4.0];
        let y = array![0.0, 0.0];
        assert_eq!(Mse.loss_prime(y_pred.view(), y.view()), array![1.0, 4.0]);
    }

    #[test]
    fn perfect_prediction_has_zero_loss() {
        let y = array![1.5, -2.0, 8.0];
        assert_eq!(Mse::new().loss(y.view(), y.view()), 0.0);
    }
}
