//! # Chain
//!
//! A randomized cyclic chain over every pointer-sized slot of a memory region. Each slot holds
//! the index of its successor, and the successor graph is a single cycle through all slots, so a
//! chase visits every slot exactly once per lap in an order that neither the hardware
//! prefetchers nor cache-line locality can anticipate.
//!
//! Slots store indices rather than raw addresses: a dependent read of `slots[i]` still has to
//! complete before the next load can be issued, which is the only property the measurement
//! needs, and every hop stays bounds-checked.
use crate::error::{ChaseError, Result};
use log::trace;
use rand::Rng;

/// Width of one slot in bytes (one pointer on the host)
pub const SLOT_BYTES: usize = std::mem::size_of::<usize>();

/// A region arranged into one randomized cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    slots: Vec<usize>,
}

impl Chain {
    /// Number of slots a region of `size_bytes` holds, rejecting regions smaller than one slot
    pub fn slot_count(size_bytes: usize) -> Result<usize> {
        if size_bytes < SLOT_BYTES {
            return Err(ChaseError::InvalidSize {
                size: size_bytes,
                slot: SLOT_BYTES,
            });
        }
        Ok(size_bytes / SLOT_BYTES)
    }

    /// Number of slots (the length of one lap)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for a built chain
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot the chase starts from
    pub fn head(&self) -> usize {
        0
    }

    /// Successor of slot `idx`
    #[inline(always)]
    pub fn next(&self, idx: usize) -> usize {
        self.slots[idx]
    }

    /// Slots visited during one lap starting at `start`, in visiting order
    pub fn lap(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(start), move |&idx| Some(self.next(idx))).take(self.len())
    }

    /// Raw successor table, indexed by slot
    pub fn successors(&self) -> &[usize] {
        &self.slots
    }
}

/// Produce an unbiased permutation of `[0, len)` with a Fisher-Yates shuffle
pub fn shuffled_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Result<Vec<usize>> {
    let mut indices = try_alloc(len, len * SLOT_BYTES)?;
    indices.extend(0..len);

    for i in 0..len.saturating_sub(1) {
        let j = i + rng.gen_range(0..len - i);
        if i != j {
            indices.swap(i, j);
        }
    }

    Ok(indices)
}

fn try_alloc(slots: usize, size: usize) -> Result<Vec<usize>> {
    let mut v = Vec::new();
    v.try_reserve_exact(slots)
        .map_err(|_| ChaseError::Allocation { size, slots })?;
    Ok(v)
}

/// Builds randomized chains, drawing all randomness from the wrapped generator
pub struct ChainBuilder<R> {
    rng: R,
}

impl<R: Rng> ChainBuilder<R> {
    pub fn new(rng: R) -> Self {
        ChainBuilder { rng }
    }

    /// Allocate a region of `size_bytes` and wire its slots into a single randomized cycle
    pub fn build(&mut self, size_bytes: usize) -> Result<Chain> {
        let len = Chain::slot_count(size_bytes)?;

        let mut slots = try_alloc(len, size_bytes)?;
        slots.resize(len, 0);

        let order = shuffled_indices(len, &mut self.rng)?;
        for pair in order.windows(2) {
            slots[pair[0]] = pair[1];
        }
        // close the cycle
        slots[order[len - 1]] = order[0];

        trace!("Built chain of {} slots for {} bytes", len, size_bytes);
        Ok(Chain { slots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_single_cycle(chain: &Chain) {
        let len = chain.len();
        for start in [0, len / 2, len - 1] {
            let mut seen = vec![false; len];
            let mut last = start;
            for idx in chain.lap(start) {
                assert!(!seen[idx], "slot {idx} revisited before closing the lap");
                seen[idx] = true;
                last = idx;
            }
            assert!(seen.iter().all(|&s| s));
            assert_eq!(chain.next(last), start);
        }
    }

    #[test]
    fn rejects_region_smaller_than_one_slot() {
        let mut builder = ChainBuilder::new(StdRng::seed_from_u64(1));
        for size in [0, 1, SLOT_BYTES - 1] {
            match builder.build(size) {
                Err(ChaseError::InvalidSize { size: s, slot }) => {
                    assert_eq!(s, size);
                    assert_eq!(slot, SLOT_BYTES);
                }
                other => panic!("expected InvalidSize, got {other:?}"),
            }
        }
    }

    #[test]
    fn oversized_region_reports_allocation_failure() {
        let err = ChainBuilder::new(StdRng::seed_from_u64(1))
            .build(usize::MAX)
            .unwrap_err();
        match err {
            ChaseError::Allocation { size, slots } => {
                assert_eq!(size, usize::MAX);
                assert_eq!(slots, usize::MAX / SLOT_BYTES);
            }
            other => panic!("expected Allocation, got {other:?}"),
        }
    }

    #[test]
    fn single_slot_points_at_itself() {
        let chain = ChainBuilder::new(StdRng::seed_from_u64(7))
            .build(SLOT_BYTES)
            .unwrap();
        assert_eq!(chain.successors(), &[0]);
    }

    #[test]
    fn two_slots_never_self_loop() {
        for seed in 0..64 {
            let chain = ChainBuilder::new(StdRng::seed_from_u64(seed))
                .build(2 * SLOT_BYTES)
                .unwrap();
            assert_eq!(chain.successors(), &[1, 0]);
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let chain = ChainBuilder::new(StdRng::seed_from_u64(3))
            .build(10 * SLOT_BYTES + SLOT_BYTES - 1)
            .unwrap();
        assert_eq!(chain.len(), 10);
        assert_single_cycle(&chain);
    }

    #[test]
    fn kib_region_is_one_cycle() {
        let chain = ChainBuilder::new(StdRng::seed_from_u64(42))
            .build(1024)
            .unwrap();
        assert_eq!(chain.len(), 1024 / SLOT_BYTES);
        assert!(!chain.is_empty());
        assert_single_cycle(&chain);
    }

    #[test]
    fn same_seed_same_chain() {
        let a = ChainBuilder::new(StdRng::seed_from_u64(99)).build(4096).unwrap();
        let b = ChainBuilder::new(StdRng::seed_from_u64(99)).build(4096).unwrap();
        let c = ChainBuilder::new(StdRng::seed_from_u64(100)).build(4096).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(5);
        for len in [0, 1, 2, 3, 17, 256] {
            let mut perm = shuffled_indices(len, &mut rng).unwrap();
            perm.sort_unstable();
            assert_eq!(perm, (0..len).collect::<Vec<_>>());
        }
    }

    #[test]
    fn shuffle_reaches_every_arrangement_of_three() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            seen.insert(shuffled_indices(3, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 6);
    }
}
