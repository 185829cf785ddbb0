pub mod csv_log;
pub mod error;
pub mod solution_file;

pub use csv_log::write_generation_log;
pub use error::PersistenceError;
pub use solution_file::{read_solution, write_solution};
