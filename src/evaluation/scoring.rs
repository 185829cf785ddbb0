use std::collections::BTreeMap;

use crate::domain::solution::{GameScore, LocationOutcome, ScoredSolution};
use crate::domain::types::{Gene, GlobalConstants, Location};
use crate::evaluation::error::ScoringError;
use crate::utils::round_to;

/// Score an assignment.
///
/// `active` holds only the locations carrying at least one station, keyed by
/// location name. Every other location in `locations` is treated as station-less
/// and hands part of its demand to active neighbours. All accumulation walks
/// ordered containers so identical inputs always produce identical output.
pub fn score<'a>(
    active: &BTreeMap<&str, Gene>,
    locations: &'a [Location],
    constants: &GlobalConstants,
) -> Result<ScoredSolution<'a>, ScoringError> {
    let mut outcomes: BTreeMap<&'a str, LocationOutcome<'a>> = BTreeMap::new();
    let mut inactive: Vec<&'a Location> = Vec::new();

    for loc in locations {
        let Some(&gene) = active.get(loc.name.as_str()) else {
            inactive.push(loc);
            continue;
        };

        let sales_capacity = constants.sales_capacity(gene);
        if sales_capacity <= 0.0 {
            return Err(ScoringError::NoSalesCapacity {
                location: loc.name.clone(),
                freestyle3100: gene.freestyle3100,
                freestyle9100: gene.freestyle9100,
                capacity: sales_capacity,
            });
        }

        outcomes.insert(
            loc.name.as_str(),
            LocationOutcome {
                location: loc,
                gene,
                sales_capacity,
                leasing_cost: constants.leasing_cost(gene),
                sales_volume: loc.sales_volume * constants.refill_sales_factor,
                sales: 0.0,
                revenue: 0.0,
                earnings: 0.0,
                co2_savings_grams: 0.0,
                footfall: loc.footfall,
            },
        );
    }

    if outcomes.is_empty() {
        return Err(ScoringError::EmptySolution);
    }

    distribute_sales(&mut outcomes, &inactive, constants);
    divide_footfall(&mut outcomes);

    let mut solution = ScoredSolution {
        locations: BTreeMap::new(),
        game_score: GameScore::default(),
        total_revenue: 0.0,
        total_leasing_cost: 0.0,
        total_freestyle3100_count: 0,
        total_freestyle9100_count: 0,
    };

    let co2_per_unit_saved =
        constants.classic_unit_data.co2_per_unit_in_grams - constants.refill_unit_data.co2_per_unit_in_grams;

    for (name, mut outcome) in outcomes {
        outcome.sales = outcome.sales_volume.min(outcome.sales_capacity).round();
        outcome.revenue = outcome.sales * constants.refill_unit_data.profit_per_unit;
        outcome.earnings = outcome.revenue - outcome.leasing_cost;
        outcome.co2_savings_grams =
            outcome.sales * co2_per_unit_saved - constants.static_co2(outcome.gene);

        solution.total_freestyle3100_count += u32::from(outcome.gene.freestyle3100);
        solution.total_freestyle9100_count += u32::from(outcome.gene.freestyle9100);
        solution.total_revenue += outcome.revenue;
        solution.total_leasing_cost += outcome.leasing_cost;
        solution.game_score.kg_co2_savings += outcome.co2_savings_grams / 1000.0;
        solution.game_score.total_footfall += outcome.footfall / 1000.0;

        solution.locations.insert(name, outcome);
    }

    let game_score = &mut solution.game_score;
    solution.total_revenue = round_to(solution.total_revenue, 2);
    game_score.kg_co2_savings = round_to(game_score.kg_co2_savings, 2);
    game_score.earnings = (solution.total_revenue - solution.total_leasing_cost) / 1000.0;
    game_score.total_footfall = round_to(game_score.total_footfall, 4);
    game_score.total = round_to(
        (game_score.kg_co2_savings * constants.co2_price_per_kilo_in_sek + game_score.earnings)
            * (1.0 + game_score.total_footfall),
        2,
    );

    Ok(solution)
}

/// Spread the demand of station-less locations over their active neighbours,
/// favouring closer ones exponentially.
fn distribute_sales(
    outcomes: &mut BTreeMap<&str, LocationOutcome<'_>>,
    inactive: &[&Location],
    constants: &GlobalConstants,
) {
    let base = constants.constant_exp_distribution_function;
    let threshold = constants.willingness_to_travel_in_meters;

    for loc in inactive {
        let weights: Vec<(&str, f64)> = loc
            .neighbour_distances
            .iter()
            .filter(|(name, _)| outcomes.contains_key(name.as_str()))
            .map(|(name, dist)| (name.as_str(), base.powf(threshold - dist) - 1.0))
            .collect();

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total == 0.0 {
            continue;
        }

        let volume = loc.sales_volume * constants.refill_sales_factor;
        for (name, weight) in weights {
            if let Some(target) = outcomes.get_mut(name) {
                target.sales_volume += weight * constants.refill_distribution_rate * volume / total;
            }
        }
    }
}

/// Share footfall between a station and the active stations next to it.
fn divide_footfall(outcomes: &mut BTreeMap<&str, LocationOutcome<'_>>) {
    let shares: Vec<(&str, usize)> = outcomes
        .iter()
        .map(|(&name, outcome)| {
            let active_neighbours = outcome
                .location
                .neighbour_distances
                .keys()
                .filter(|n| outcomes.contains_key(n.as_str()))
                .count();
            (name, 1 + active_neighbours)
        })
        .collect();

    for (name, count) in shares {
        if let Some(outcome) = outcomes.get_mut(name) {
            outcome.footfall = outcome.location.footfall / count as f64;
        }
    }
}
