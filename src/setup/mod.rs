pub mod init;

pub use init::{build_problem_instance, locations_from_map};
