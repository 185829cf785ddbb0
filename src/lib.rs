pub mod api;
pub mod config;
pub mod distance;
pub mod domain;
pub mod evaluation;
pub mod fixtures;
pub mod persistence;
pub mod setup;
pub mod solver;
pub mod utils;
