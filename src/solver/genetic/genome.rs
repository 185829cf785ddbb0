use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use crate::domain::types::{Gene, GlobalConstants, Location};
use crate::evaluation::{score, ScoringError};

/// One full assignment of station counts, index-aligned with the location list.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    genes: Vec<Gene>,
    /// Only meaningful after `evaluate`.
    pub fitness: f64,
    max_count: u8,
}

impl Genome {
    /// Counts above `max_count - 1` are clamped.
    pub fn from_genes(genes: Vec<Gene>, max_count: u8) -> Self {
        let top = max_count.saturating_sub(1);
        let genes = genes
            .into_iter()
            .map(|g| Gene::new(g.freestyle3100.min(top), g.freestyle9100.min(top)))
            .collect();
        Self {
            genes,
            fitness: 0.0,
            max_count,
        }
    }

    pub fn empty(len: usize, max_count: u8) -> Self {
        Self::from_genes(vec![Gene::default(); len], max_count)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize, max_count: u8) -> Self {
        let genes = (0..len).map(|_| random_gene(rng, max_count)).collect();
        Self::from_genes(genes, max_count)
    }

    /// Like `random`, but every location is left empty with probability 0.5.
    pub fn random_sparse<R: Rng + ?Sized>(rng: &mut R, len: usize, max_count: u8) -> Self {
        let genes = (0..len)
            .map(|_| {
                if rng.gen_bool(0.5) {
                    random_gene(rng, max_count)
                } else {
                    Gene::default()
                }
            })
            .collect();
        Self::from_genes(genes, max_count)
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Perturb every gene.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, prob: f64) {
        for i in 0..self.genes.len() {
            self.perturb_gene(rng, i, prob);
        }
    }

    /// Perturb a single random gene.
    pub fn mutate_one<R: Rng + ?Sized>(&mut self, rng: &mut R, prob: f64) {
        if self.genes.is_empty() {
            return;
        }
        let i = rng.gen_range(0..self.genes.len());
        self.perturb_gene(rng, i, prob);
    }

    /// Perturb a random gene together with the genes of its geographic neighbours.
    pub fn mutate_neighbours<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        prob: f64,
        locations: &[Location],
    ) {
        if self.genes.is_empty() {
            return;
        }
        let i = rng.gen_range(0..self.genes.len());
        self.perturb_gene(rng, i, prob);
        for &n in &locations[i].neighbour_indices {
            self.perturb_gene(rng, n, prob);
        }
    }

    /// Each count of gene `i` moves one step up or down with probability `prob`.
    fn perturb_gene<R: Rng + ?Sized>(&mut self, rng: &mut R, i: usize, prob: f64) {
        let top = self.max_count.saturating_sub(1);
        let gene = &mut self.genes[i];
        for count in [&mut gene.freestyle3100, &mut gene.freestyle9100] {
            if rng.gen::<f64>() < prob {
                *count = if rng.gen_bool(0.5) {
                    count.saturating_sub(1)
                } else {
                    count.saturating_add(1).min(top)
                };
            }
        }
    }

    /// Two-point crossover with random cut points.
    pub fn crossover<R: Rng + ?Sized>(&self, rng: &mut R, other: &Genome) -> (Genome, Genome) {
        let c1 = rng.gen_range(0..=self.genes.len());
        let c2 = rng.gen_range(c1..=self.genes.len());
        self.crossover_at(other, c1, c2)
    }

    /// Swap the segment `c1..c2` between the two parents.
    pub fn crossover_at(&self, other: &Genome, c1: usize, c2: usize) -> (Genome, Genome) {
        debug_assert_eq!(self.genes.len(), other.genes.len());
        debug_assert!(c1 <= c2 && c2 <= self.genes.len());

        let mut first = self.genes.clone();
        let mut second = other.genes.clone();
        first[c1..c2].copy_from_slice(&other.genes[c1..c2]);
        second[c1..c2].copy_from_slice(&self.genes[c1..c2]);

        (self.child(first), self.child(second))
    }

    /// Exchange one randomly chosen gene between the parents.
    pub fn crossover_single_pair<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        other: &Genome,
    ) -> (Genome, Genome) {
        if self.genes.is_empty() {
            return (self.clone(), other.clone());
        }
        let c = rng.gen_range(0..self.genes.len());
        self.crossover_single_pair_at(other, c)
    }

    pub fn crossover_single_pair_at(&self, other: &Genome, c: usize) -> (Genome, Genome) {
        debug_assert_eq!(self.genes.len(), other.genes.len());

        let mut first = self.genes.clone();
        let mut second = other.genes.clone();
        first[c] = other.genes[c];
        second[c] = self.genes[c];

        (self.child(first), self.child(second))
    }

    fn child(&self, genes: Vec<Gene>) -> Genome {
        Genome {
            genes,
            fitness: 0.0,
            max_count: self.max_count,
        }
    }

    /// Locations with at least one station, keyed by name.
    pub fn active_assignments<'a>(&self, locations: &'a [Location]) -> BTreeMap<&'a str, Gene> {
        locations
            .iter()
            .zip(&self.genes)
            .filter(|(_, gene)| gene.is_active())
            .map(|(loc, gene)| (loc.name.as_str(), *gene))
            .collect()
    }

    /// Score this genome and store the composite total as its fitness.
    ///
    /// A genome without any station scores 0 without touching the scorer. Any
    /// error that does come back means the station constants cannot support the
    /// configured count domain, which the caller must treat as fatal.
    pub fn evaluate(
        &mut self,
        locations: &[Location],
        constants: &GlobalConstants,
    ) -> Result<(), ScoringError> {
        let active = self.active_assignments(locations);
        if active.is_empty() {
            self.fitness = 0.0;
            return Ok(());
        }
        self.fitness = score(&active, locations, constants)?.game_score.total;
        Ok(())
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.genes {
            write!(f, "{}{}", gene.freestyle3100, gene.freestyle9100)?;
        }
        Ok(())
    }
}

fn random_gene<R: Rng + ?Sized>(rng: &mut R, max_count: u8) -> Gene {
    let k = max_count.max(1);
    Gene::new(rng.gen_range(0..k), rng.gen_range(0..k))
}
