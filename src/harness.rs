//! # Harness
//!
//! One measurement round: for a given region size, spawn one fresh OS thread per requested core,
//! pin each to its core, let each build and chase its own private chain, join them all, and
//! reduce their per-read latencies to a mean.
//!
//! Workers never share a chain. Each receives an immutable [`WorkerConfig`] when it is spawned and
//! hands its result back through its join handle. Besides the join at the end of the round, the
//! only synchronization is a start gate: no worker builds or chases its chain until every worker
//! has been pinned, and one pinning failure stops the whole round before any tracing starts.
use crate::affinity::{CoreAffinity, CoreBinder};
use crate::chain::{Chain, ChainBuilder};
use crate::error::{ChaseError, Result};
use crate::format_size;
use crate::laps::{LapPolicy, ScaledLaps};
use crate::tracer::{PointerChaser, Tracer};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

/// Everything a single worker needs for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Logical core the worker is pinned to
    pub core: usize,
    /// Size of the worker's private region
    pub size_bytes: usize,
    /// Number of slot reads to time
    pub count: u64,
    /// Seed for the worker's chain, or `None` to seed from the OS
    pub seed: Option<u64>,
}

/// Runs measurement rounds with a pluggable tracer, core binder and lap policy
#[derive(Debug, Default, Clone)]
pub struct Harness<T = PointerChaser, B = CoreAffinity, P = ScaledLaps> {
    tracer: T,
    binder: B,
    laps: P,
    seed: Option<u64>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Tracer, B: CoreBinder, P: LapPolicy> Harness<T, B, P> {
    pub fn with_tracer<T2: Tracer>(self, tracer: T2) -> Harness<T2, B, P> {
        Harness {
            tracer,
            binder: self.binder,
            laps: self.laps,
            seed: self.seed,
        }
    }

    pub fn with_binder<B2: CoreBinder>(self, binder: B2) -> Harness<T, B2, P> {
        Harness {
            tracer: self.tracer,
            binder,
            laps: self.laps,
            seed: self.seed,
        }
    }

    pub fn with_laps<P2: LapPolicy>(self, laps: P2) -> Harness<T, B, P2> {
        Harness {
            tracer: self.tracer,
            binder: self.binder,
            laps,
            seed: self.seed,
        }
    }

    /// Make chain construction reproducible; worker `n` seeds its generator with `seed + n`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Mean nanoseconds per read over `cores` workers chasing private regions of `size_bytes`
    pub fn measure(&self, size_bytes: usize, cores: usize) -> Result<f64> {
        if cores == 0 {
            return Err(ChaseError::NoWorkers);
        }
        Chain::slot_count(size_bytes)?;

        let count = self.laps.count(size_bytes).max(1);
        info!(
            "Measuring {} region on {} cores ({} reads per worker)",
            format_size(size_bytes),
            cores,
            count
        );

        let gate = PinGate::new(cores);
        let results = thread::scope(|s| -> Result<Vec<Result<Option<f64>>>> {
            let mut handles = Vec::with_capacity(cores);
            for core in 0..cores {
                let config = WorkerConfig {
                    core,
                    size_bytes,
                    count,
                    seed: self.seed,
                };
                let gate = &gate;
                let spawned = thread::Builder::new()
                    .name(format!("chase-{core}"))
                    .spawn_scoped(s, move || self.run_worker(config, gate));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        // release the workers already parked at the gate
                        gate.abort();
                        return Err(ChaseError::Spawn { core, source });
                    }
                }
            }

            // join barrier: every worker finishes before any result is used
            Ok(handles
                .into_iter()
                .enumerate()
                .map(|(core, handle)| {
                    handle
                        .join()
                        .unwrap_or(Err(ChaseError::WorkerPanicked { core }))
                })
                .collect())
        })?;

        // a worker only skips its trace when another one failed, so any skip is paired with an error
        let mut mean_ns = 0.0;
        for ns in results {
            if let Some(ns) = ns? {
                mean_ns += ns / cores as f64;
            }
        }
        Ok(mean_ns)
    }

    /// Returns `None` when the round was aborted by another worker before this one started
    fn run_worker(&self, config: WorkerConfig, gate: &PinGate) -> Result<Option<f64>> {
        let pinned = self.binder.bind(config.core);
        if !gate.arrive(pinned.is_ok()) {
            pinned?;
            debug!(
                "Worker on CPU core {} skipped, another worker failed to pin",
                config.core
            );
            return Ok(None);
        }

        if thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max)
            .is_err()
        {
            warn!(
                "Couldn't set worker on CPU core {} to maximum thread priority",
                config.core
            );
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(config.core as u64)),
            None => StdRng::from_entropy(),
        };
        let chain = ChainBuilder::new(rng).build(config.size_bytes)?;

        let secs = self.tracer.trace(&chain, config.count);
        drop(chain);

        let ns = secs * 1e9 / config.count as f64;
        debug!(
            "Worker on CPU core {} took {:.6}s, {:.5} ns per read",
            config.core, secs, ns
        );
        Ok(Some(ns))
    }
}

/// Holds pinned workers until every worker of the round has tried to pin. A single failure opens
/// the gate at once and tells everyone to stop.
struct PinGate {
    state: Mutex<GateState>,
    opened: Condvar,
}

struct GateState {
    waiting: usize,
    failed: bool,
}

impl PinGate {
    fn new(workers: usize) -> Self {
        PinGate {
            state: Mutex::new(GateState {
                waiting: workers,
                failed: false,
            }),
            opened: Condvar::new(),
        }
    }

    /// Report this worker's pinning outcome and wait for the rest. True when the round may run.
    fn arrive(&self, pinned: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.waiting = state.waiting.saturating_sub(1);
        state.failed |= !pinned;
        if state.waiting == 0 || state.failed {
            self.opened.notify_all();
        }
        while state.waiting > 0 && !state.failed {
            state = self
                .opened
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !state.failed
    }

    fn abort(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.failed = true;
        self.opened.notify_all();
    }
}
