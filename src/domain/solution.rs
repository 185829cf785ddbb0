use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::{Gene, Location};

/// Scored view of one location that carries at least one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOutcome<'a> {
    pub location: &'a Location,
    pub gene: Gene,
    pub sales_capacity: f64,
    pub leasing_cost: f64,
    /// Own volume plus whatever was redistributed from station-less neighbours.
    pub sales_volume: f64,
    pub sales: f64,
    pub revenue: f64,
    pub earnings: f64,
    pub co2_savings_grams: f64,
    /// Footfall after sharing it with nearby stations.
    pub footfall: f64,
}

impl<'a> LocationOutcome<'a> {
    pub fn name(&self) -> &'a str {
        &self.location.name
    }

    pub fn location_type(&self) -> &'a str {
        &self.location.location_type
    }

    pub fn footfall_scale(&self) -> f64 {
        self.location.footfall_scale
    }

    pub fn base_sales_volume(&self) -> f64 {
        self.location.sales_volume
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
    pub kg_co2_savings: f64,
    pub earnings: f64,
    pub total_footfall: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSolution<'a> {
    pub locations: BTreeMap<&'a str, LocationOutcome<'a>>,
    pub game_score: GameScore,
    pub total_revenue: f64,
    pub total_leasing_cost: f64,
    pub total_freestyle3100_count: u32,
    pub total_freestyle9100_count: u32,
}

/// One row of a persisted solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionEntry {
    pub location_name: String,
    pub freestyle3100_count: u8,
    pub freestyle9100_count: u8,
}

/// Assignment for every location of a map, as written to and read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRecord {
    pub game_id: String,
    pub map_name: String,
    pub locations: Vec<SolutionEntry>,
}

/// Response of the remote scorer after a submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameResult {
    pub id: String,
    #[serde(rename = "gameScore")]
    pub score: GameScore,
}
