use crate::chain::Chain;
use std::hint::black_box;
use std::time::Instant;

/// Walks a chain and reports how long the walk took
pub trait Tracer: Sync {
    /// Perform exactly `count` dependent slot reads starting at the chain head, returning the
    /// elapsed wall-clock time in seconds
    fn trace(&self, chain: &Chain, count: u64) -> f64;
}

/// Default tracer: dependent loads through the chain, unrolled to keep loop overhead small
/// relative to memory latency
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerChaser;

impl Tracer for PointerChaser {
    #[inline(never)]
    fn trace(&self, chain: &Chain, count: u64) -> f64 {
        let mut idx = chain.head();

        // Warmup: traverse once to ensure TLB is populated
        for _ in 0..chain.len() {
            idx = chain.next(idx);
        }
        idx = black_box(idx);

        let start = Instant::now();

        for _ in 0..count / 8 {
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
            idx = chain.next(idx);
        }
        for _ in 0..count % 8 {
            idx = chain.next(idx);
        }

        let elapsed = start.elapsed();

        // Prevent dead code elimination
        black_box(idx);

        elapsed.as_secs_f64()
    }
}
