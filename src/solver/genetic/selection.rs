use rand::seq::SliceRandom;
use rand::Rng;

use crate::solver::genetic::genome::Genome;

/// How a ranked population of `n` is split to build the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReproductionPlan {
    /// Top genomes copied unchanged; the elite at index 0 is always among them.
    pub clones: usize,
    /// Ranked genomes right after the clones that are paired for crossover.
    pub crossover: usize,
    /// Fresh sparse genomes injected at the end.
    pub random: usize,
}

impl ReproductionPlan {
    pub fn for_population(n: usize) -> Self {
        let clones = (n / 10).max(1).min(n);
        let random = ((n as f64 / 10.0).round() as usize).min(n - clones);
        Self {
            clones,
            crossover: n - clones - random,
            random,
        }
    }
}

pub fn select_for_cloning(ranked: &[Genome], plan: &ReproductionPlan) -> Vec<Genome> {
    ranked[..plan.clones].to_vec()
}

pub fn select_for_crossover<'a>(ranked: &'a [Genome], plan: &ReproductionPlan) -> &'a [Genome] {
    &ranked[plan.clones..plan.clones + plan.crossover]
}

/// Pair parents along a random permutation and apply single-pair crossover to
/// each pair. Produces exactly as many children as parents; an unpaired last
/// parent is carried over as is.
pub fn crossover_parents<R: Rng + ?Sized>(rng: &mut R, parents: &[Genome]) -> Vec<Genome> {
    let mut order: Vec<usize> = (0..parents.len()).collect();
    order.shuffle(rng);

    let mut children = Vec::with_capacity(parents.len());
    for pair in order.chunks(2) {
        match *pair {
            [a, b] => {
                let (first, second) = parents[a].crossover_single_pair(rng, &parents[b]);
                children.push(first);
                children.push(second);
            }
            [a] => children.push(parents[a].clone()),
            _ => unreachable!(),
        }
    }
    children
}

pub fn random_injection<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    len: usize,
    max_count: u8,
) -> Vec<Genome> {
    (0..count)
        .map(|_| Genome::random_sparse(rng, len, max_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn plan_always_refills_population() {
        for n in 1..300 {
            let plan = ReproductionPlan::for_population(n);
            assert_eq!(plan.clones + plan.crossover + plan.random, n, "n = {}", n);
            assert!(plan.clones >= 1);
        }
        assert_eq!(
            ReproductionPlan::for_population(1000),
            ReproductionPlan {
                clones: 100,
                crossover: 800,
                random: 100
            }
        );
    }

    #[test]
    fn crossover_keeps_parent_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for count in [0, 1, 2, 7, 10] {
            let parents: Vec<Genome> = (0..count).map(|_| Genome::random(&mut rng, 15, 3)).collect();
            let children = crossover_parents(&mut rng, &parents);
            assert_eq!(children.len(), count);
            assert!(children.iter().all(|c| c.len() == 15));
        }
    }

    #[test]
    fn children_differ_from_a_parent_in_at_most_one_gene() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let full = vec![Genome::empty(12, 3), Genome::random(&mut rng, 12, 3)];

        let children = crossover_parents(&mut rng, &full);
        for child in &children {
            let closest = full
                .iter()
                .map(|p| {
                    p.genes()
                        .iter()
                        .zip(child.genes())
                        .filter(|(a, b)| a != b)
                        .count()
                })
                .min()
                .unwrap();
            assert!(closest <= 1);
        }
    }
}
