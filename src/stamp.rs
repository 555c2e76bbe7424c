// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Epoch Stamps

/// Identity of one `setup` + `simulate` cycle inside an engine.
pub type Epoch = u64;

/// Per-node boolean flags that reset for free between runs.
///
/// Each slot stores the epoch that last set it; a flag reads as set only when
/// that epoch is the current one, so a new run never has to clear the array.
#[derive(Debug, Clone)]
pub struct EpochFlags {
    stamps: Vec<Option<Epoch>>,
}

impl EpochFlags {
    pub fn new(len: usize) -> Self {
        Self { stamps: vec![None; len] }
    }

    #[inline]
    pub fn mark(&mut self, i: usize, epoch: Epoch) {
        self.stamps[i] = Some(epoch);
    }

    #[inline]
    pub fn is_marked(&self, i: usize, epoch: Epoch) -> bool {
        self.stamps[i] == Some(epoch)
    }
}
