use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::domain::types::{DeviceData, GlobalConstants, Location, UnitData};

const CENTRE: (f64, f64) = (59.8586, 17.6389);
const LAT_SPREAD: f64 = 0.004;
const LON_SPREAD: f64 = 0.008;

/// (location type, weekly sales volume)
const LOCATION_TYPES: [(&str, f64); 5] = [
    ("groceryStoreLarge", 400.0),
    ("groceryStore", 250.0),
    ("convenience", 150.0),
    ("gasStation", 100.0),
    ("kiosk", 60.0),
];

/// A bare location at the given coordinates with no demand and no neighbours.
pub fn location_at(name: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        name: name.to_string(),
        location_type: LOCATION_TYPES[0].0.to_string(),
        latitude,
        longitude,
        footfall: 0.0,
        footfall_scale: 1.0,
        sales_volume: 0.0,
        neighbour_distances: BTreeMap::new(),
        neighbour_indices: Vec::new(),
    }
}

/// Generates `count` locations named `location1..=count` scattered around a
/// city centre. The same seed always yields the same map.
pub fn generate_locations(count: usize, seed: u64) -> Vec<Location> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=count)
        .map(|i| {
            let (location_type, sales_volume) = LOCATION_TYPES[rng.gen_range(0..LOCATION_TYPES.len())];
            let latitude = CENTRE.0 + rng.gen_range(-LAT_SPREAD..LAT_SPREAD);
            let longitude = CENTRE.1 + rng.gen_range(-LON_SPREAD..LON_SPREAD);
            Location {
                name: format!("location{}", i),
                location_type: location_type.to_string(),
                latitude,
                longitude,
                footfall: rng.gen_range(0.0..1000.0_f64).round(),
                footfall_scale: f64::from(rng.gen_range(1..=5_u8)),
                sales_volume,
                neighbour_distances: BTreeMap::new(),
                neighbour_indices: Vec::new(),
            }
        })
        .collect()
}

/// Constants in the same ballpark as a real competition round.
pub fn sample_constants() -> GlobalConstants {
    GlobalConstants {
        classic_unit_data: UnitData {
            unit_type: "classic".to_string(),
            co2_per_unit_in_grams: 80.0,
            profit_per_unit: 2.0,
        },
        refill_unit_data: UnitData {
            unit_type: "refill".to_string(),
            co2_per_unit_in_grams: 20.0,
            profit_per_unit: 15.0,
        },
        freestyle3100_data: DeviceData {
            device_type: "freestyle3100".to_string(),
            leasing_cost_per_week: 500.0,
            refill_capacity_per_week: 70.0,
            static_co2: 3000.0,
        },
        freestyle9100_data: DeviceData {
            device_type: "freestyle9100".to_string(),
            leasing_cost_per_week: 1500.0,
            refill_capacity_per_week: 438.0,
            static_co2: 7000.0,
        },
        co2_price_per_kilo_in_sek: 5.0,
        willingness_to_travel_in_meters: 150.0,
        constant_exp_distribution_function: 1.01,
        refill_sales_factor: 0.3,
        refill_distribution_rate: 0.8,
        competition_map_names: Vec::new(),
        training_map_names: vec!["synthetic".to_string()],
    }
}

/// Locations plus constants, ready for the neighbour index.
pub fn generate_map(count: usize, seed: u64) -> (Vec<Location>, GlobalConstants) {
    info!("Generating synthetic map with {} locations (seed {})", count, seed);
    (generate_locations(count, seed), sample_constants())
}
