use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// The station counts declared for a location yield no refill capacity.
    #[error(
        "location {location} has no sales capacity ({capacity}) with \
         {freestyle3100} x Freestyle 3100 and {freestyle9100} x Freestyle 9100"
    )]
    NoSalesCapacity {
        location: String,
        freestyle3100: u8,
        freestyle9100: u8,
        capacity: f64,
    },
    #[error("no locations in solution")]
    EmptySolution,
}
