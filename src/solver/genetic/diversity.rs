use crate::solver::genetic::genome::Genome;

/// Normalized Shannon diversity of a population, in `[0, 1]`.
///
/// For every gene position and both station counts the value frequencies across
/// the population give an entropy (base 2); the mean entropy is divided by
/// `log2(max_count)`, the entropy of a uniform spread over all values.
pub fn population_diversity(population: &[Genome], max_count: u8) -> f64 {
    let k = usize::from(max_count);
    let Some(first) = population.first() else {
        return 0.0;
    };
    if k < 2 || first.is_empty() {
        return 0.0;
    }

    let positions = first.len();
    // counts[position][component][value]
    let mut counts = vec![[vec![0usize; k], vec![0usize; k]]; positions];
    for genome in population {
        for (slot, gene) in counts.iter_mut().zip(genome.genes()) {
            slot[0][usize::from(gene.freestyle3100).min(k - 1)] += 1;
            slot[1][usize::from(gene.freestyle9100).min(k - 1)] += 1;
        }
    }

    let size = population.len() as f64;
    let total: f64 = counts
        .iter()
        .flat_map(|slot| slot.iter())
        .map(|values| shannon_entropy(values, size))
        .sum();
    let mean = total / (positions * 2) as f64;

    mean / (k as f64).log2()
}

fn shannon_entropy(counts: &[usize], size: f64) -> f64 {
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / size;
            p * p.log2()
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Gene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn identical_population_has_no_diversity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let genome = Genome::random(&mut rng, 30, 3);
        let population = vec![genome; 50];
        assert_eq!(population_diversity(&population, 3), 0.0);
    }

    #[test]
    fn uniform_population_has_full_diversity() {
        for k in [2u8, 3, 6] {
            let population: Vec<Genome> = (0..k)
                .map(|v| Genome::from_genes(vec![Gene::new(v, v); 10], k))
                .collect();
            let d = population_diversity(&population, k);
            assert!((d - 1.0).abs() < 1e-12, "k = {}: {}", k, d);
        }
    }

    #[test]
    fn random_population_is_in_between() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut population: Vec<Genome> = (0..40).map(|_| Genome::random(&mut rng, 25, 3)).collect();
        let random = population_diversity(&population, 3);
        assert!(random > 0.8 && random <= 1.0);

        for genome in population.iter_mut().skip(10) {
            *genome = Genome::empty(25, 3);
        }
        let collapsed = population_diversity(&population, 3);
        assert!(collapsed > 0.0 && collapsed < random);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(population_diversity(&[], 3), 0.0);
        let population = vec![Genome::empty(5, 1), Genome::empty(5, 1)];
        assert_eq!(population_diversity(&population, 1), 0.0);
    }
}
