/// Decides how many slot reads a worker performs for a region of a given size
pub trait LapPolicy: Sync {
    fn count(&self, size_bytes: usize) -> u64;
}

/// `max(size_bytes * per_byte, floor)`: enough reads that thread start-up and timer resolution
/// vanish in the total, growing with the region so large regions still get a stable sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledLaps {
    pub per_byte: u64,
    pub floor: u64,
}

impl Default for ScaledLaps {
    fn default() -> Self {
        ScaledLaps {
            per_byte: 16,
            floor: 1 << 30,
        }
    }
}

impl LapPolicy for ScaledLaps {
    fn count(&self, size_bytes: usize) -> u64 {
        (size_bytes as u64)
            .saturating_mul(self.per_byte)
            .max(self.floor)
    }
}

/// Same number of reads for every size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLaps(pub u64);

impl LapPolicy for FixedLaps {
    fn count(&self, _size_bytes: usize) -> u64 {
        self.0
    }
}
