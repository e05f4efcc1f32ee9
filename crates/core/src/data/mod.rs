mod factor;
mod io;
mod ratings;

pub use factor::LevelIndex;
pub use ratings::RatingMatrix;
