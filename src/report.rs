use crate::sweep::SweepPoint;
use std::io::{self, Write};

/// Column header matching [`Report::row`]
pub const HEADER: &str = "   memsize  time in ns";

/// Writes sweep points as fixed-width rows, flushing after every line so long sweeps can be
/// followed as they run
pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Report { out }
    }

    pub fn header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{HEADER}")?;
        self.out.flush()
    }

    pub fn row(&mut self, point: &SweepPoint) -> io::Result<()> {
        writeln!(self.out, " {:>9}  {:>10.5}", point.size, point.mean_ns)?;
        self.out.flush()
    }
}
