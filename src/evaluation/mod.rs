pub mod error;
pub mod scoring;

pub use error::ScoringError;
pub use scoring::score;
