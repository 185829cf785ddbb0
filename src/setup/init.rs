use itertools::Itertools;
use tracing::{debug, info, span, Level};

use crate::distance::precompute_neighbour_distances;
use crate::domain::types::{GlobalConstants, Location, MapData, ProblemInstance};
use crate::utils::natural_key;

/// Flatten the provider's keyed map into a stable list: `location2` sorts
/// before `location10`.
pub fn locations_from_map(map: MapData) -> Vec<Location> {
    let locations: Vec<Location> = map
        .locations
        .into_values()
        .sorted_by(|a, b| {
            natural_key(&a.name)
                .cmp(&natural_key(&b.name))
                .then_with(|| a.name.cmp(&b.name))
        })
        .collect();
    debug!(
        "Location order: {:?}",
        locations.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
    );
    locations
}

pub fn build_problem_instance(
    map_name: &str,
    mut locations: Vec<Location>,
    constants: GlobalConstants,
) -> ProblemInstance {
    let span = span!(Level::INFO, "setup", map = map_name);
    let _guard = span.enter();

    info!(
        "Building problem for '{}' with {} locations",
        map_name,
        locations.len()
    );
    precompute_neighbour_distances(&mut locations, constants.willingness_to_travel_in_meters);

    ProblemInstance {
        map_name: map_name.to_string(),
        locations,
        constants,
    }
}
