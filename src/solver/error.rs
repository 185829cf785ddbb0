use thiserror::Error;

use crate::evaluation::ScoringError;

#[derive(Debug, Error)]
pub enum SolverError {
    /// A genome declared stations the constants cannot give any capacity.
    #[error("configuration rejected during search: {0}")]
    Configuration(#[from] ScoringError),
    /// Caught before searching: some reachable count combination has no capacity.
    #[error(
        "station constants give no capacity ({capacity}) for {freestyle3100} x Freestyle 3100 \
         and {freestyle9100} x Freestyle 9100"
    )]
    UnsupportedCounts {
        freestyle3100: u8,
        freestyle9100: u8,
        capacity: f64,
    },
    #[error("invalid solver settings: {0}")]
    InvalidSettings(String),
}
