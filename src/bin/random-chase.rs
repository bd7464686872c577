//! Cache and Memory Latency Measurement via Pointer Chasing
//!
//! Sweeps region sizes between the compile-time bounds in `random_chase::config`, measuring each
//! with one pinned worker per core, and prints one row of mean latency per size.

use log::info;
use random_chase::harness::Harness;
use random_chase::report::Report;
use random_chase::sweep::SweepConfig;
use std::io::Write;
use std::process::ExitCode;

// use faster/smaller `mimalloc` allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn run() -> random_chase::Result<()> {
    let config = SweepConfig::default();
    let harness = Harness::new();
    info!(
        "Sweeping {}..={} bytes, granularity {}, {} cores",
        config.min_size, config.max_size, config.granularity, config.cores
    );

    let mut report = Report::new(std::io::stdout().lock());
    report.header()?;
    for point in config.run(&harness)? {
        report.row(&point?)?;
    }
    Ok(())
}

/// Turn the run's outcome into the process status, reporting a failure on `err`. Logging may be
/// filtered off, so the reason for a failed run is written directly.
fn exit_status(result: random_chase::Result<()>, err: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // nothing more to report if stderr itself is gone
            let _ = writeln!(err, "random-chase: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    exit_status(run(), &mut std::io::stderr())
}
