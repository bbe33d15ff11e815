use rand::Rng;

/// Picks the index of the lowest-scoring of `size` contestants drawn
/// uniformly, with replacement, from `scores`.
pub(crate) fn tournament(scores: &[f64], size: usize, rng: &mut impl Rng) -> usize {
    assert!(!scores.is_empty(), "Tournament requires a non-empty population");
    let mut best = rng.gen_range(0..scores.len());
    for _ in 1..size.max(1) {
        let idx = rng.gen_range(0..scores.len());
        if scores[idx] < scores[best] {
            best = idx;
        }
    }
    best
}

/// Gets the indices of the `count` lowest scores, best first.
pub(crate) fn elites(scores: &[f64], count: usize) -> Vec<usize> {
    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    order.truncate(count);
    order
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tournament_favours_low_scores() {
        let scores = [5.0, 1.0, 9.0, 3.0, 7.0];
        let mut rng = StdRng::seed_from_u64(4);
        let mut wins = [0; 5];
        for _ in 0..2000 {
            wins[tournament(&scores, 3, &mut rng)] += 1;
        }
        assert!(wins[1] > wins[3]);
        assert!(wins[3] > wins[0]);
        assert!(wins[1] > wins[2]);
    }

    #[test]
    fn tournament_of_one_is_uniform_pick() {
        let scores = [1.0, 2.0];
        let mut rng = StdRng::seed_from_u64(4);
        let picks = (0..200).map(|_| tournament(&scores, 1, &mut rng)).collect::<Vec<_>>();
        assert!(picks.contains(&0) && picks.contains(&1));
    }

    #[test]
    fn elites_are_sorted_best_first() {
        let scores = [5.0, 1.0, 9.0, 3.0, 7.0];
        assert_eq!(elites(&scores, 3), vec![1, 3, 0]);
        assert_eq!(elites(&scores, 0), Vec::<usize>::new());
    }
}
