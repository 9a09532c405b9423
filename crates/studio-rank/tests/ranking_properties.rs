use proptest::prelude::*;
use studio_rank::{rank, RankingConfig, RankingMode};

fn scores_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1000.0, 0..40)
}

#[test]
fn test_spec_vector_orders_extremes() {
    let ranking = rank(&[99.0, 70.0, 85.0, 99.0, 70.0], &RankingConfig::default());
    let pos = |i| ranking.position_of(i).unwrap();
    assert!(pos(0) < pos(1) && pos(0) < pos(4));
    assert!(pos(3) < pos(1) && pos(3) < pos(4));
}

#[test]
fn test_seed_is_part_of_the_input() {
    let scores = [71.0, 93.0, 88.0, 70.0, 99.0, 86.0, 90.0, 77.0, 84.0, 95.0];
    let a = rank(&scores, &RankingConfig::default().with_seed(1));
    let b = rank(&scores, &RankingConfig::default().with_seed(1));
    assert_eq!(a, b);
    assert_eq!(a.mode(), RankingMode::Forest);
}

#[test]
fn test_integer_scores_in_reference_range() {
    let scores: Vec<f64> = (70..100).map(f64::from).collect();
    let ranking = rank(&scores, &RankingConfig::default());
    assert_eq!(ranking.len(), 30);
    assert_eq!(ranking.mode(), RankingMode::Forest);
    // Lowest score is both extreme and low, so it never leads
    assert_ne!(ranking.best(), Some(0));
}

proptest! {
    #[test]
    fn prop_rank_is_permutation(scores in scores_strategy()) {
        let ranking = rank(&scores, &RankingConfig::default());
        let mut seen = ranking.indices().to_vec();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..scores.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_rank_is_deterministic(scores in scores_strategy(), seed in any::<u64>()) {
        let config = RankingConfig::default().with_seed(seed);
        prop_assert_eq!(rank(&scores, &config), rank(&scores, &config));
    }

    #[test]
    fn prop_uniform_scores_are_identity(value in 0.0f64..100.0, len in 0usize..30) {
        let scores = vec![value; len];
        let ranking = rank(&scores, &RankingConfig::default());
        prop_assert_eq!(ranking.into_indices(), (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn prop_fallback_is_descending(scores in prop::collection::vec(0.0f64..100.0, 0..5)) {
        let ranking = rank(&scores, &RankingConfig::default());
        let ordered: Vec<f64> = ranking.iter().map(|i| scores[i]).collect();
        prop_assert!(ordered.windows(2).all(|w| w[0] >= w[1]));
    }
}
