pub mod neighbours;

pub use neighbours::precompute_neighbour_distances;
