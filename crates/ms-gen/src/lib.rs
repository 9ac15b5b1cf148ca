#![forbid(unsafe_code)]

use ms_case::{QuerySet, TestCase};
use rand::Rng;

/// Inclusive bounds for the per-case density modulus. Each candidate rank
/// is included with probability `1/density`, so case-to-case query density
/// swings between roughly 50% and roughly 2%.
pub const DENSITY_MIN: u32 = 2;
pub const DENSITY_MAX: u32 = 49;

/// Draws `size` independent uniform values in `[0, max_bound)`.
///
/// No uniqueness constraint; duplicates are part of the test surface and
/// both the oracle and the solver must handle them.
pub fn random_array(rng: &mut impl Rng, size: usize, max_bound: u64) -> Vec<u64> {
    (0..size).map(|_| rng.random_range(0..max_bound)).collect()
}

/// Draws the per-case density modulus, uniform over
/// `[DENSITY_MIN, DENSITY_MAX]`.
pub fn draw_density(rng: &mut impl Rng) -> u32 {
    rng.random_range(DENSITY_MIN..=DENSITY_MAX)
}

/// Samples the query ranks for an array of `size` elements.
///
/// Rank 1 is always present, which keeps every query set non-empty and
/// gives each case a deterministic minimum query. Every further rank in
/// `2..=size` is included iff a fresh draw in `[0, density)` lands on zero.
/// Ranks are visited in increasing order, so the result is strictly
/// increasing without a sort.
pub fn sample_query_ranks(rng: &mut impl Rng, size: usize, density: u32) -> QuerySet {
    let mut ranks = vec![1];
    for rank in 2..=size {
        if rng.random_range(0..density) == 0 {
            ranks.push(rank);
        }
    }
    QuerySet::new(ranks)
}

/// Builds one full random case: a uniform array below `max_bound` plus a
/// query set thinned by a freshly drawn density.
pub fn random_case(rng: &mut impl Rng, size: usize, max_bound: u64) -> TestCase {
    let values = random_array(rng, size, max_bound);
    let density = draw_density(rng);
    let queries = sample_query_ranks(rng, size, density);
    TestCase::new(values, queries)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{
        DENSITY_MAX, DENSITY_MIN, draw_density, random_array, random_case, sample_query_ranks,
    };

    #[test]
    fn array_values_respect_exclusive_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = random_array(&mut rng, 4096, 200);
        assert_eq!(values.len(), 4096);
        assert!(values.iter().all(|&v| v < 200));
    }

    #[test]
    fn density_draw_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let density = draw_density(&mut rng);
            assert!((DENSITY_MIN..=DENSITY_MAX).contains(&density));
        }
    }

    #[test]
    fn size_one_query_set_is_exactly_rank_one() {
        let mut rng = StdRng::seed_from_u64(13);
        let queries = sample_query_ranks(&mut rng, 1, DENSITY_MAX);
        assert_eq!(queries.ranks(), &[1]);
    }

    #[test]
    fn inclusion_fraction_tracks_density_two() {
        let mut rng = StdRng::seed_from_u64(17);
        let size = 200_000;
        let queries = sample_query_ranks(&mut rng, size, 2);
        // Rank 1 is unconditional; the thinning applies to size-1 candidates.
        let fraction = (queries.len() - 1) as f64 / (size - 1) as f64;
        assert!((fraction - 0.5).abs() < 0.01, "fraction={fraction}");
    }

    #[test]
    fn inclusion_fraction_tracks_density_forty_nine() {
        let mut rng = StdRng::seed_from_u64(19);
        let size = 500_000;
        let queries = sample_query_ranks(&mut rng, size, 49);
        let fraction = (queries.len() - 1) as f64 / (size - 1) as f64;
        let target = 1.0 / 49.0;
        assert!((fraction - target).abs() < 0.005, "fraction={fraction}");
    }

    proptest! {
        #[test]
        fn sampled_query_sets_satisfy_case_invariants(
            seed in any::<u64>(),
            size in 1_usize..512,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let density = draw_density(&mut rng);
            let queries = sample_query_ranks(&mut rng, size, density);
            queries.validate(size).expect("sampler output is always valid");
            prop_assert_eq!(queries.ranks()[0], 1);
        }

        #[test]
        fn random_cases_validate_end_to_end(
            seed in any::<u64>(),
            size in 1_usize..256,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let case = random_case(&mut rng, size, 1_000_000);
            prop_assert_eq!(case.size(), size);
            case.validate().expect("generated case is always valid");
        }
    }
}
