use crate::config::SignalConfig;
use rand::Rng;
use smallvec::SmallVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The timing of one intersection's signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gene {
    /// The green duration of the controlled axis.
    pub green: u32,
    /// The phase offset within the cycle.
    pub offset: u32,
}

/// A candidate timing plan, holding one [Gene] per intersection
/// in intersection ID order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Genome {
    genes: SmallVec<[Gene; 8]>,
}

impl Gene {
    /// Creates a new gene.
    pub const fn new(green: u32, offset: u32) -> Self {
        Self { green, offset }
    }

    /// Draws a legal gene uniformly at random.
    pub fn random(config: &SignalConfig, rng: &mut impl Rng) -> Self {
        Self {
            green: config.green.sample(rng),
            offset: rng.gen_range(0..config.cycle_length),
        }
    }

    /// Clamps the green duration into the legal range
    /// and wraps the offset into the cycle.
    pub fn clamped(&self, config: &SignalConfig) -> Self {
        Self {
            green: config.green.clamp(self.green),
            offset: self.offset % config.cycle_length,
        }
    }

    /// Resamples either the green duration or the offset, chosen with equal odds.
    fn mutate(&mut self, config: &SignalConfig, rng: &mut impl Rng) {
        if rng.gen_bool(0.5) {
            self.green = config.green.sample(rng);
        } else {
            self.offset = rng.gen_range(0..config.cycle_length);
        }
    }
}

impl Genome {
    /// Creates a genome from its genes.
    pub fn new(genes: impl IntoIterator<Item = Gene>) -> Self {
        Self {
            genes: genes.into_iter().collect(),
        }
    }

    /// Draws a genome of `len` legal genes uniformly at random.
    pub fn random(len: usize, config: &SignalConfig, rng: &mut impl Rng) -> Self {
        Self {
            genes: (0..len).map(|_| Gene::random(config, rng)).collect(),
        }
    }

    /// The genes, in intersection ID order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// The number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the genome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Returns a copy with every gene clamped into the legal range.
    pub fn clamped(&self, config: &SignalConfig) -> Self {
        Self::new(self.genes.iter().map(|gene| gene.clamped(config)))
    }

    /// Whether every gene lies within the legal range.
    pub fn is_legal(&self, config: &SignalConfig) -> bool {
        self.genes
            .iter()
            .all(|gene| config.green.contains(gene.green) && gene.offset < config.cycle_length)
    }

    /// Mutates each gene independently with probability `rate`.
    pub fn mutate(&mut self, rate: f64, config: &SignalConfig, rng: &mut impl Rng) {
        for gene in &mut self.genes {
            if rng.gen_bool(rate) {
                gene.mutate(config, rng);
            }
        }
    }

    /// Crosses two parents over at one or two random gene boundaries,
    /// producing two children.
    ///
    /// Genomes shorter than two genes have no interior boundary,
    /// so the children are copies of the parents.
    pub fn crossover(a: &Genome, b: &Genome, rng: &mut impl Rng) -> (Genome, Genome) {
        let (mut c1, mut c2) = (a.clone(), b.clone());
        let len = usize::min(a.len(), b.len());
        if len < 2 {
            return (c1, c2);
        }

        // Pick the segment of genes to exchange
        let (from, to) = if len >= 3 && rng.gen_bool(0.5) {
            let first = rng.gen_range(1..len);
            let mut second = rng.gen_range(1..len - 1);
            if second >= first {
                second += 1;
            }
            (usize::min(first, second), usize::max(first, second))
        } else {
            (rng.gen_range(1..len), len)
        };

        for idx in from..to {
            std::mem::swap(&mut c1.genes[idx], &mut c2.genes[idx]);
        }
        (c1, c2)
    }
}

impl std::ops::Index<usize> for Genome {
    type Output = Gene;

    fn index(&self, idx: usize) -> &Gene {
        &self.genes[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Interval;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_genomes_are_legal() {
        let config = SignalConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let genome = Genome::random(6, &config, &mut rng);
            assert_eq!(genome.len(), 6);
            assert!(genome.is_legal(&config));
        }
    }

    #[test]
    fn mutation_stays_legal() {
        let config = SignalConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut genome = Genome::random(6, &config, &mut rng);
        for _ in 0..200 {
            genome.mutate(1.0, &config, &mut rng);
            assert!(genome.is_legal(&config));
        }
    }

    #[test]
    fn zero_mutation_rate_leaves_genome_unchanged() {
        let config = SignalConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let original = Genome::random(6, &config, &mut rng);
        let mut genome = original.clone();
        genome.mutate(0.0, &config, &mut rng);
        assert_eq!(genome, original);
    }

    #[test]
    fn crossover_exchanges_genes_at_boundaries() {
        let a = Genome::new((0..6).map(|i| Gene::new(20 + i, 0)));
        let b = Genome::new((0..6).map(|i| Gene::new(40 + i, 30)));
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let (c1, c2) = Genome::crossover(&a, &b, &mut rng);
            for idx in 0..6 {
                // Each position holds the pair of parent genes, possibly swapped
                let swapped = c1[idx] == b[idx];
                assert_eq!(c2[idx], if swapped { a[idx] } else { b[idx] });
                assert!(swapped || c1[idx] == a[idx]);
            }
            // The first gene is never exchanged
            assert_eq!(c1[0], a[0]);
        }
    }

    #[test]
    fn crossover_of_single_gene_copies_parents() {
        let a = Genome::new([Gene::new(20, 1)]);
        let b = Genome::new([Gene::new(50, 2)]);
        let (c1, c2) = Genome::crossover(&a, &b, &mut StdRng::seed_from_u64(0));
        assert_eq!((c1, c2), (a, b));
    }

    #[test]
    fn clamping_wraps_offsets() {
        let config = SignalConfig {
            green: Interval::new(20, 55),
            ..Default::default()
        };
        let genome = Genome::new([Gene::new(5, 61), Gene::new(80, 120), Gene::new(30, 59)]);
        let clamped = genome.clamped(&config);
        assert_eq!(
            clamped.genes(),
            &[Gene::new(20, 1), Gene::new(55, 0), Gene::new(30, 59)]
        );
    }
}
