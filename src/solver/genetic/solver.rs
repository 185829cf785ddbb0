use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, error, info, span, trace, warn, Level};

use crate::config::SolverConfig;
use crate::domain::solution::{ScoredSolution, SolutionEntry, SolutionRecord};
use crate::domain::types::{Gene, GenerationLog, ProblemInstance};
use crate::evaluation::{score, ScoringError};
use crate::solver::error::SolverError;
use crate::solver::genetic::diversity::population_diversity;
use crate::solver::genetic::genome::Genome;
use crate::solver::genetic::selection::{
    crossover_parents, random_injection, select_for_cloning, select_for_crossover,
    ReproductionPlan,
};

/// Below this diversity the mutation probability is raised.
const DIVERSITY_FLOOR: f64 = 0.4;

/// Genetic search over station assignments.
pub struct Solver {
    config: SolverConfig,
    instance: ProblemInstance,
    population: Vec<Genome>,
    best: Option<Genome>,
    best_solution: f64,
    worst_solution: f64,
    average_score: f64,
    diversity: f64,
    last_improvement: usize,
    generation: usize,
    opt_log: Vec<GenerationLog>,
    rng: ChaCha8Rng,
    stop: Arc<AtomicBool>,
}

impl Solver {
    /// Validates the settings and the constants against the count domain before
    /// anything is searched.
    pub fn new(config: SolverConfig, instance: ProblemInstance) -> Result<Self, SolverError> {
        validate(&config, &instance)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            config,
            instance,
            population: Vec::new(),
            best: None,
            best_solution: 0.0,
            worst_solution: 0.0,
            average_score: 0.0,
            diversity: 0.0,
            last_improvement: 0,
            generation: 0,
            opt_log: Vec::new(),
            rng,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends the search at the top of the next generation once set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn instance(&self) -> &ProblemInstance {
        &self.instance
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn best_genome(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    pub fn opt_log(&self) -> &[GenerationLog] {
        &self.opt_log
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn last_improvement(&self) -> usize {
        self.last_improvement
    }

    pub fn diversity(&self) -> f64 {
        self.diversity
    }

    pub fn seed_population(&mut self) {
        let len = self.instance.locations.len();
        let k = self.config.max_device_count;
        self.population = (0..self.config.population_size)
            .map(|_| Genome::random(&mut self.rng, len, k))
            .collect();
        info!("Seeded {} random genomes", self.population.len());
    }

    /// Start from a stored solution: the whole population becomes copies of it.
    /// Locations are matched by name; unknown names are ignored and missing ones
    /// start empty.
    pub fn load_seed(&mut self, record: &SolutionRecord) {
        if record.map_name != self.instance.map_name {
            warn!(
                "Seed solution is for map '{}', solving '{}'",
                record.map_name, self.instance.map_name
            );
        }

        let by_name: HashMap<&str, &SolutionEntry> = record
            .locations
            .iter()
            .map(|entry| (entry.location_name.as_str(), entry))
            .collect();

        let genes: Vec<Gene> = self
            .instance
            .locations
            .iter()
            .map(|loc| {
                by_name
                    .get(loc.name.as_str())
                    .map(|e| Gene::new(e.freestyle3100_count, e.freestyle9100_count))
                    .unwrap_or_default()
            })
            .collect();

        let matched = self
            .instance
            .locations
            .iter()
            .filter(|loc| by_name.contains_key(loc.name.as_str()))
            .count();
        if matched < record.locations.len() {
            warn!(
                "{} seed entries did not match any location",
                record.locations.len() - matched
            );
        }

        let seed = Genome::from_genes(genes, self.config.max_device_count);
        self.population = vec![seed; self.config.population_size];
        info!(
            "Seeded population from stored solution ({} of {} locations matched)",
            matched,
            self.instance.locations.len()
        );
    }

    /// Best-ever assignment for every location, in location-list order.
    pub fn export_solution(&self, game_id: &str) -> Option<SolutionRecord> {
        let best = self.best.as_ref()?;
        let locations = self
            .instance
            .locations
            .iter()
            .zip(best.genes())
            .map(|(loc, gene)| SolutionEntry {
                location_name: loc.name.clone(),
                freestyle3100_count: gene.freestyle3100,
                freestyle9100_count: gene.freestyle9100,
            })
            .collect();

        Some(SolutionRecord {
            game_id: game_id.to_string(),
            map_name: self.instance.map_name.clone(),
            locations,
        })
    }

    /// Fully itemized score of the best-ever genome.
    pub fn best_scored_solution(&self) -> Option<Result<ScoredSolution<'_>, ScoringError>> {
        let best = self.best.as_ref()?;
        let active = best.active_assignments(&self.instance.locations);
        Some(score(&active, &self.instance.locations, &self.instance.constants))
    }

    /// Run generations until the best fitness stops improving, the generation cap
    /// is hit or the stop flag is raised.
    pub fn optimize(&mut self) -> Result<(), SolverError> {
        if self.population.is_empty() {
            self.seed_population();
        }

        let search_span = span!(
            Level::INFO,
            "genetic_search",
            population = self.config.population_size,
            locations = self.instance.locations.len()
        );
        let _search_guard = search_span.enter();

        let mut generation = 0;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop requested, finishing at generation {}", generation);
                break;
            }
            if self.config.generation_limit.is_some_and(|limit| generation >= limit) {
                info!("Generation limit {} reached", generation);
                break;
            }

            self.generation = generation;
            self.evaluate_population()?;
            self.rank_population(generation);
            self.diversity = population_diversity(&self.population, self.config.max_device_count);
            self.log_generation(generation);

            let stagnation = generation.saturating_sub(self.last_improvement);
            if stagnation >= self.config.improvement_limit {
                info!(
                    "No improvement for {} generations, ending at generation {}",
                    stagnation, generation
                );
                break;
            }

            self.next_generation(stagnation);
            generation += 1;
        }

        if let Some(best) = &self.best {
            info!(
                "Search finished after {} generations, best {:.2} found at generation {}",
                self.opt_log.len(),
                best.fitness,
                self.last_improvement
            );
        }
        Ok(())
    }

    /// Score every genome in parallel. Genomes only write their own fitness.
    pub fn evaluate_population(&mut self) -> Result<(), SolverError> {
        let locations = &self.instance.locations;
        let constants = &self.instance.constants;

        self.population
            .par_iter_mut()
            .try_for_each(|genome| genome.evaluate(locations, constants))
            .map_err(|e| {
                error!("Aborting search: {}", e);
                SolverError::Configuration(e)
            })
    }

    /// Sort best-first, record a new best-ever genome and put a copy of it in
    /// place of the weakest genome, at the front.
    pub fn rank_population(&mut self, generation: usize) {
        self.population
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let Some(top) = self.population.first() else {
            return;
        };
        let improved = self
            .best
            .as_ref()
            .map_or(true, |best| top.fitness > best.fitness);
        if improved {
            info!("(Generation {}) New best: {:.2}", generation, top.fitness);
            trace!("New best genome: {}", top);
            self.best = Some(top.clone());
            self.last_improvement = generation;
        }

        if let Some(best) = &self.best {
            self.population.pop();
            self.population.insert(0, best.clone());
        }

        let n = self.population.len() as f64;
        self.best_solution = self.population[0].fitness;
        self.worst_solution = self.population[self.population.len() - 1].fitness;
        self.average_score = self.population.iter().map(|g| g.fitness).sum::<f64>() / n;
    }

    /// Build the next population from the ranked one. Past the escape threshold
    /// the population is kept and every non-elite genome takes a forced
    /// neighbourhood mutation instead of reproduction.
    fn next_generation(&mut self, stagnation: usize) {
        if stagnation > self.config.escape_threshold {
            debug!("Stuck for {} generations, forcing neighbour mutation", stagnation);
            self.mutate_population(1.0);
        } else {
            self.reproduce();
            let prob = self.effective_mutation_probability();
            self.mutate_population(prob);
        }
    }

    fn reproduce(&mut self) {
        let n = self.population.len();
        let len = self.instance.locations.len();
        let plan = ReproductionPlan::for_population(n);

        let mut next = select_for_cloning(&self.population, &plan);
        next.extend(crossover_parents(
            &mut self.rng,
            select_for_crossover(&self.population, &plan),
        ));
        next.extend(random_injection(
            &mut self.rng,
            plan.random,
            len,
            self.config.max_device_count,
        ));

        debug_assert_eq!(next.len(), n);
        self.population = next;
    }

    fn effective_mutation_probability(&self) -> f64 {
        let mut prob = self.config.mutation_probability;
        if self.diversity < DIVERSITY_FLOOR {
            prob += 2.0 * (DIVERSITY_FLOOR - self.diversity);
        }
        prob.min(1.0)
    }

    /// Neighbour mutation for everyone but the elite at index 0.
    fn mutate_population(&mut self, prob: f64) {
        let locations = &self.instance.locations;
        for genome in self.population.iter_mut().skip(1) {
            genome.mutate_neighbours(&mut self.rng, prob, locations);
        }
    }

    fn log_generation(&mut self, generation: usize) {
        debug!(
            "Generation {}: best {:.2}, worst {:.2}, average {:.2}, diversity {:.4}",
            generation, self.best_solution, self.worst_solution, self.average_score, self.diversity
        );
        self.opt_log.push(GenerationLog {
            generation,
            best_solution: self.best_solution,
            worst_solution: self.worst_solution,
            average_score: self.average_score,
            diversity: self.diversity,
        });
    }
}

fn validate(config: &SolverConfig, instance: &ProblemInstance) -> Result<(), SolverError> {
    if config.population_size < 2 {
        return Err(SolverError::InvalidSettings(format!(
            "population size must be at least 2, got {}",
            config.population_size
        )));
    }
    if config.max_device_count == 0 {
        return Err(SolverError::InvalidSettings(
            "max device count must be at least 1".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.mutation_probability) {
        return Err(SolverError::InvalidSettings(format!(
            "mutation probability must be within [0, 1], got {}",
            config.mutation_probability
        )));
    }
    if instance.locations.is_empty() {
        return Err(SolverError::InvalidSettings(format!(
            "map '{}' has no locations",
            instance.map_name
        )));
    }

    for f3 in 0..config.max_device_count {
        for f9 in 0..config.max_device_count {
            let gene = Gene::new(f3, f9);
            if !gene.is_active() {
                continue;
            }
            let capacity = instance.constants.sales_capacity(gene);
            if capacity <= 0.0 {
                error!(
                    "Rejecting constants: {} x F3100 + {} x F9100 has capacity {}",
                    f3, f9, capacity
                );
                return Err(SolverError::UnsupportedCounts {
                    freestyle3100: f3,
                    freestyle9100: f9,
                    capacity,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Location;
    use crate::fixtures::data_generator::generate_map;
    use crate::setup::init::build_problem_instance;

    fn instance(count: usize) -> ProblemInstance {
        let (locations, constants) = generate_map(count, 21);
        build_problem_instance("synthetic", locations, constants)
    }

    fn config() -> SolverConfig {
        SolverConfig {
            population_size: 30,
            mutation_probability: 0.1,
            improvement_limit: 25,
            escape_threshold: 10,
            generation_limit: Some(200),
            max_device_count: 3,
            seed: Some(7),
        }
    }

    #[test]
    fn rejects_constants_without_capacity() {
        let mut inst = instance(5);
        inst.constants.freestyle9100_data.refill_capacity_per_week = 0.0;
        match Solver::new(config(), inst) {
            Err(SolverError::UnsupportedCounts {
                freestyle3100: 0,
                freestyle9100: 1,
                ..
            }) => {}
            other => panic!("unexpected: {:?}", other.err()),
        }
    }

    #[test]
    fn rejects_bad_settings() {
        let mut cfg = config();
        cfg.population_size = 1;
        assert!(matches!(
            Solver::new(cfg, instance(5)),
            Err(SolverError::InvalidSettings(_))
        ));

        let mut cfg = config();
        cfg.mutation_probability = 1.5;
        assert!(matches!(
            Solver::new(cfg, instance(5)),
            Err(SolverError::InvalidSettings(_))
        ));
    }

    #[test]
    fn ranking_puts_best_ever_copy_first() {
        let mut solver = Solver::new(config(), instance(20)).unwrap();
        solver.seed_population();
        solver.evaluate_population().unwrap();
        let top = solver
            .population()
            .iter()
            .map(|g| g.fitness)
            .fold(f64::NEG_INFINITY, f64::max);

        solver.rank_population(0);

        assert_eq!(solver.population().len(), 30);
        assert_eq!(solver.population()[0].fitness, top);
        assert_eq!(solver.best_genome().unwrap().fitness, top);
        assert_eq!(solver.population()[0], *solver.best_genome().unwrap());
    }

    #[test]
    fn low_diversity_raises_mutation_probability() {
        let mut solver = Solver::new(config(), instance(5)).unwrap();
        solver.diversity = 0.9;
        assert_eq!(solver.effective_mutation_probability(), 0.1);
        solver.diversity = 0.3;
        assert!((solver.effective_mutation_probability() - 0.3).abs() < 1e-12);
        solver.diversity = 0.0;
        assert_eq!(solver.effective_mutation_probability(), 0.9);
    }

    #[test]
    fn reproduction_keeps_population_size_and_elite() {
        let mut solver = Solver::new(config(), instance(20)).unwrap();
        solver.seed_population();
        solver.evaluate_population().unwrap();
        solver.rank_population(0);
        let elite = solver.population()[0].clone();

        solver.reproduce();
        solver.mutate_population(1.0);

        assert_eq!(solver.population().len(), 30);
        assert_eq!(solver.population()[0], elite);
    }

    fn within_one_neighbourhood(before: &Genome, after: &Genome, locations: &[Location]) -> bool {
        let changed: Vec<usize> = (0..before.len())
            .filter(|&i| before.genes()[i] != after.genes()[i])
            .collect();
        (0..locations.len()).any(|c| {
            changed
                .iter()
                .all(|&i| i == c || locations[c].neighbour_indices.contains(&i))
        })
    }

    #[test]
    fn stagnation_past_threshold_mutates_in_place() {
        let mut solver = Solver::new(config(), instance(20)).unwrap();
        solver.seed_population();
        solver.evaluate_population().unwrap();
        solver.rank_population(0);
        let before = solver.population().to_vec();

        solver.next_generation(config().escape_threshold + 1);

        let after = solver.population();
        let locations = &solver.instance().locations;
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0], before[0]);
        for (old, new) in before.iter().zip(after).skip(1) {
            assert!(within_one_neighbourhood(old, new, locations));
        }
        assert!(before.iter().zip(after).skip(1).any(|(old, new)| old.genes() != new.genes()));
    }

    #[test]
    fn stagnation_at_threshold_still_reproduces() {
        let mut solver = Solver::new(config(), instance(20)).unwrap();
        solver.seed_population();
        solver.evaluate_population().unwrap();
        solver.rank_population(0);
        let before = solver.population().to_vec();

        solver.next_generation(config().escape_threshold);

        let locations = &solver.instance().locations;
        let reshuffled = before
            .iter()
            .zip(solver.population())
            .skip(1)
            .filter(|(old, new)| !within_one_neighbourhood(old, new, locations))
            .count();
        assert!(reshuffled > 0);
    }
}
