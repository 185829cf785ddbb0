pub mod error;
pub mod genetic;

pub use error::SolverError;
