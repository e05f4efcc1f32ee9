mod mean_squares;
mod sample;

pub use mean_squares::{decompose, MeanSquares, DEGENERATE_TOLERANCE};
pub use sample::sample_variance;
