use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use random_chase::chain::{ChainBuilder, SLOT_BYTES, shuffled_indices};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_slot_visited_once_per_lap(slots in 1_usize..2048, seed in any::<u64>(), start in any::<usize>()) {
        let chain = ChainBuilder::new(StdRng::seed_from_u64(seed))
            .build(slots * SLOT_BYTES)
            .unwrap();
        prop_assert_eq!(chain.len(), slots);

        let start = start % slots;
        let mut seen = vec![false; slots];
        let mut last = start;
        for idx in chain.lap(start) {
            prop_assert!(!seen[idx]);
            seen[idx] = true;
            last = idx;
        }
        prop_assert!(seen.iter().all(|&s| s));
        prop_assert_eq!(chain.next(last), start);
    }

    #[test]
    fn no_self_loops_beyond_one_slot(slots in 2_usize..512, seed in any::<u64>()) {
        let chain = ChainBuilder::new(StdRng::seed_from_u64(seed))
            .build(slots * SLOT_BYTES)
            .unwrap();
        for (idx, &next) in chain.successors().iter().enumerate() {
            prop_assert_ne!(idx, next);
        }
    }

    #[test]
    fn shuffle_is_bijection(len in 0_usize..4096, seed in any::<u64>()) {
        let mut perm = shuffled_indices(len, &mut StdRng::seed_from_u64(seed)).unwrap();
        perm.sort_unstable();
        prop_assert!(perm.into_iter().eq(0..len));
    }

    #[test]
    fn seeded_builds_are_reproducible(slots in 1_usize..1024, seed in any::<u64>()) {
        let a = ChainBuilder::new(StdRng::seed_from_u64(seed)).build(slots * SLOT_BYTES).unwrap();
        let b = ChainBuilder::new(StdRng::seed_from_u64(seed)).build(slots * SLOT_BYTES).unwrap();
        prop_assert_eq!(a, b);
    }
}
