//! # Sweep
//!
//! Walks region sizes from a minimum to a maximum in steps that are themselves powers of two
//! proportional to the current size, so every octave gets the same number of samples
//! (`2^granularity`). Each size is measured by a [`Harness`] round and yields one [`SweepPoint`].
use crate::affinity::CoreBinder;
use crate::config::{GRANULARITY, MAX_SIZE, MIN_SIZE, NUM_CPUS};
use crate::error::{ChaseError, Result};
use crate::harness::Harness;
use crate::laps::LapPolicy;
use crate::tracer::Tracer;
use log::debug;

/// Mean read latency measured for one region size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub size: usize,
    pub mean_ns: f64,
}

/// Bounds and resolution of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub granularity: u32,
    pub cores: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            min_size: MIN_SIZE,
            max_size: MAX_SIZE,
            granularity: GRANULARITY,
            cores: NUM_CPUS,
        }
    }
}

impl SweepConfig {
    /// An inverted range is not an error: the sweep simply has no sizes to visit
    pub fn validate(&self) -> Result<()> {
        if self.cores == 0 {
            return Err(ChaseError::InvalidConfig(
                "core count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Region sizes this sweep visits, in order
    pub fn sizes(&self) -> Sizes {
        Sizes {
            next: Some(self.min_size),
            max: self.max_size,
            granularity: self.granularity,
        }
    }

    /// Start a sweep driven by `harness`; sizes are measured lazily as the sweep is iterated
    pub fn run<'h, T, B, P>(&self, harness: &'h Harness<T, B, P>) -> Result<Sweep<'h, T, B, P>>
    where
        T: Tracer,
        B: CoreBinder,
        P: LapPolicy,
    {
        self.validate()?;
        Ok(Sweep {
            harness,
            sizes: self.sizes(),
            cores: self.cores,
            failed: false,
        })
    }
}

/// Distance from `size` to the next sampled size
pub fn step(size: usize, granularity: u32) -> usize {
    let magnitude = size.max(1).ilog2();
    1 << (magnitude.max(granularity) - granularity)
}

/// Geometric progression of region sizes
#[derive(Debug, Clone)]
pub struct Sizes {
    next: Option<usize>,
    max: usize,
    granularity: u32,
}

impl Iterator for Sizes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let size = self.next.filter(|&s| s <= self.max)?;
        // a zero size is reported once so the harness can reject it
        self.next = if size == 0 {
            None
        } else {
            size.checked_add(step(size, self.granularity))
        };
        Some(size)
    }
}

/// Lazy, single-pass sequence of measurements. Stops after the first error.
pub struct Sweep<'h, T, B, P> {
    harness: &'h Harness<T, B, P>,
    sizes: Sizes,
    cores: usize,
    failed: bool,
}

impl<T: Tracer, B: CoreBinder, P: LapPolicy> Iterator for Sweep<'_, T, B, P> {
    type Item = Result<SweepPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let size = self.sizes.next()?;
        match self.harness.measure(size, self.cores) {
            Ok(mean_ns) => {
                debug!("Sweep point {} bytes: {:.5} ns", size, mean_ns);
                Some(Ok(SweepPoint { size, mean_ns }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
