use std::env;
use std::str::FromStr;

use dotenv::dotenv;
use tracing::warn;

pub mod constant {
    pub(crate) const POPULATION_SIZE: usize = 1000;
    pub(crate) const MUTATION_PROBABILITY: f64 = 0.1;
    pub(crate) const IMPROVEMENT_LIMIT: usize = 3000;
    pub(crate) const ESCAPE_THRESHOLD: usize = 1000;
    pub(crate) const MAX_DEVICE_COUNT: u8 = 3;
    pub(crate) const MAP_NAME: &str = "uppsala";
    pub(crate) const BASE_URL: &str = "https://api.considition.com";
    pub(crate) const OUTPUT_DIR: &str = "solutions";
    pub(crate) const SYNTHETIC_LOCATION_COUNT: usize = 60;
    pub(crate) const SYNTHETIC_SEED: u64 = 12345;
}

/// Knobs of the genetic search.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub population_size: usize,
    pub mutation_probability: f64,
    /// Generations without a new best before the run ends.
    pub improvement_limit: usize,
    /// Generations without a new best before the escape pass kicks in.
    pub escape_threshold: usize,
    pub generation_limit: Option<usize>,
    /// K: device counts live in `0..max_device_count`.
    pub max_device_count: u8,
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: constant::POPULATION_SIZE,
            mutation_probability: constant::MUTATION_PROBABILITY,
            improvement_limit: constant::IMPROVEMENT_LIMIT,
            escape_threshold: constant::ESCAPE_THRESHOLD,
            generation_limit: None,
            max_device_count: constant::MAX_DEVICE_COUNT,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();
        Self {
            population_size: env_or("POPULATION_SIZE", defaults.population_size),
            mutation_probability: env_or("MUTATION_PROBABILITY", defaults.mutation_probability),
            improvement_limit: env_or("IMPROVEMENT_LIMIT", defaults.improvement_limit),
            escape_threshold: env_or("ESCAPE_THRESHOLD", defaults.escape_threshold),
            generation_limit: env_opt("GENERATION_LIMIT"),
            max_device_count: env_or("MAX_DEVICE_COUNT", defaults.max_device_count),
            seed: env_opt("SOLVER_SEED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSource {
    Api,
    Synthetic,
}

/// Everything around the solver: where the map comes from and where results go.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub map_name: String,
    pub map_source: MapSource,
    pub seed_solution: Option<String>,
    pub submit: bool,
    pub output_dir: String,
}

impl RunConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        let map_source = match env::var("MAP_SOURCE").as_deref() {
            Ok("synthetic") => MapSource::Synthetic,
            Ok("api") | Err(_) => MapSource::Api,
            Ok(other) => {
                warn!("Unknown MAP_SOURCE '{}', falling back to api", other);
                MapSource::Api
            }
        };

        Self {
            api_key: env::var("CONSIDITION_API_KEY").ok(),
            base_url: env::var("CONSIDITION_BASE_URL")
                .unwrap_or_else(|_| constant::BASE_URL.to_string()),
            map_name: env::var("MAP_NAME").unwrap_or_else(|_| constant::MAP_NAME.to_string()),
            map_source,
            seed_solution: env::var("SEED_SOLUTION").ok(),
            submit: env_or("SUBMIT", false),
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| constant::OUTPUT_DIR.to_string()),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).unwrap_or(default)
}

fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable value for {}: '{}'", key, raw);
            None
        }
    }
}
