use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A candidate site as delivered by the map provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "locationName")]
    pub name: String,
    #[serde(rename = "locationType")]
    pub location_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub footfall: f64,
    #[serde(rename = "footfallScale")]
    pub footfall_scale: f64,
    #[serde(rename = "salesVolume")]
    pub sales_volume: f64,
    /// Neighbour name -> distance in meters, filled by the neighbour index.
    #[serde(skip)]
    pub neighbour_distances: BTreeMap<String, f64>,
    /// Positions of the same neighbours in the location list.
    #[serde(skip)]
    pub neighbour_indices: Vec<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    #[serde(rename = "mapName")]
    pub name: String,
    #[serde(default)]
    pub border: Option<Border>,
    pub locations: HashMap<String, Location>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub latitude_max: f64,
    pub latitude_min: f64,
    pub longitude_max: f64,
    pub longitude_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    #[serde(rename = "type", default)]
    pub unit_type: String,
    pub co2_per_unit_in_grams: f64,
    pub profit_per_unit: f64,
}

/// Per-station leasing, throughput and footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    #[serde(rename = "type", default)]
    pub device_type: String,
    pub leasing_cost_per_week: f64,
    pub refill_capacity_per_week: f64,
    pub static_co2: f64,
}

/// Global economic and environmental constants, read-only for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConstants {
    pub classic_unit_data: UnitData,
    pub refill_unit_data: UnitData,
    #[serde(rename = "freestyle3100Data")]
    pub freestyle3100_data: DeviceData,
    #[serde(rename = "freestyle9100Data")]
    pub freestyle9100_data: DeviceData,
    pub co2_price_per_kilo_in_sek: f64,
    pub willingness_to_travel_in_meters: f64,
    pub constant_exp_distribution_function: f64,
    pub refill_sales_factor: f64,
    pub refill_distribution_rate: f64,
    #[serde(default)]
    pub competition_map_names: Vec<String>,
    #[serde(default)]
    pub training_map_names: Vec<String>,
}

impl GlobalConstants {
    pub fn sales_capacity(&self, gene: Gene) -> f64 {
        f64::from(gene.freestyle3100) * self.freestyle3100_data.refill_capacity_per_week
            + f64::from(gene.freestyle9100) * self.freestyle9100_data.refill_capacity_per_week
    }

    pub fn leasing_cost(&self, gene: Gene) -> f64 {
        f64::from(gene.freestyle3100) * self.freestyle3100_data.leasing_cost_per_week
            + f64::from(gene.freestyle9100) * self.freestyle9100_data.leasing_cost_per_week
    }

    pub fn static_co2(&self, gene: Gene) -> f64 {
        f64::from(gene.freestyle3100) * self.freestyle3100_data.static_co2
            + f64::from(gene.freestyle9100) * self.freestyle9100_data.static_co2
    }
}

/// Station counts assigned to one location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub freestyle3100: u8,
    pub freestyle9100: u8,
}

impl Gene {
    pub fn new(freestyle3100: u8, freestyle9100: u8) -> Self {
        Self {
            freestyle3100,
            freestyle9100,
        }
    }

    pub fn is_active(&self) -> bool {
        self.freestyle3100 > 0 || self.freestyle9100 > 0
    }
}

/// Locations plus constants: everything the objective needs besides the genome.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub map_name: String,
    pub locations: Vec<Location>,
    pub constants: GlobalConstants,
}

/// Snapshot of one generation, in the order the search produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationLog {
    pub generation: usize,
    pub best_solution: f64,
    pub worst_solution: f64,
    pub average_score: f64,
    pub diversity: f64,
}
