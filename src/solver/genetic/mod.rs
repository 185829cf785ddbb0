pub mod diversity;
pub mod genome;
pub mod search;
pub mod selection;
pub mod solver;

pub use genome::Genome;
pub use solver::Solver;
