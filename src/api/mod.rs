pub mod client;
pub mod error;

pub use client::{ConsiditionClient, GameDataProvider};
pub use error::ApiError;
