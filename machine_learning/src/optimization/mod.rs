mod gradient;
mod gradient_descent;
mod optimizer;

pub use gradient::Gradient;
pub use gradient_descent::GradientDescent;
pub use optimizer::{Optimizer, StepStats, Update};
