use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::types::Location;
use crate::utils::haversine;

/// Attach to every location the locations closer than `threshold_meters`.
///
/// Each unordered pair is measured once and written under both names, so the
/// relation is symmetric. Previously attached neighbour data is replaced.
pub fn precompute_neighbour_distances(locations: &mut [Location], threshold_meters: f64) {
    let n = locations.len();
    let mut distances: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new(); n];
    let mut indices: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&locations[i], &locations[j]);
            if a.name == b.name {
                continue;
            }
            let dist = haversine(a.latitude, a.longitude, b.latitude, b.longitude);
            if dist < threshold_meters {
                distances[i].insert(b.name.clone(), dist);
                distances[j].insert(a.name.clone(), dist);
                indices[i].push(j);
                indices[j].push(i);
            }
        }
    }

    let mut pairs = 0;
    for ((loc, dist), idx) in locations.iter_mut().zip(distances).zip(indices) {
        pairs += idx.len();
        loc.neighbour_distances = dist;
        loc.neighbour_indices = idx;
    }
    for loc in locations.iter() {
        debug!("{} has {} neighbours", loc.name, loc.neighbour_indices.len());
    }

    info!(
        "Neighbour index built: {} locations, {} neighbour pairs within {} m",
        n,
        pairs / 2,
        threshold_meters
    );
}
