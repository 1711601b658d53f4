//! Symbol frequency counting.
//!
//! Counting is split across threads: every worker tallies its chunks into a
//! private [`FrequencyTable`] with no shared state, then folds that table
//! into the global one under a single lock. The lock is held only for the
//! fold (256 additions), never for the per-byte loop.

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use std::sync::Mutex;
use std::thread;

/// Number of distinct symbols (byte values).
pub const SYMBOLS: usize = 256;

/// Occurrence count for every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOLS],
}

impl FrequencyTable {
    /// An all-zero table.
    pub fn new() -> Self {
        Self {
            counts: [0; SYMBOLS],
        }
    }

    /// Count every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.add_bytes(data);
        table
    }

    /// Add the bytes of `data` to the counts.
    pub fn add_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    /// Add `count` occurrences of `symbol`.
    pub fn add(&mut self, symbol: u8, count: u64) {
        self.counts[symbol as usize] += count;
    }

    /// Fold another table into this one.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// Count of `symbol`.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts (the number of bytes counted).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Iterate over `(symbol, count)` for non-zero counts, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Raw counts indexed by symbol.
    pub fn as_array(&self) -> &[u64; SYMBOLS] {
        &self.counts
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parallel frequency counter.
///
/// Chunks are dealt round-robin to `workers` scoped threads.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyCounter {
    workers: usize,
}

impl FrequencyCounter {
    /// Create a counter using `workers` threads.
    ///
    /// # Errors
    /// Returns `Error::Config` if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("counting workers must be positive".into()));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Count symbol occurrences across all `chunks`.
    ///
    /// The result is independent of how the input was chunked and of the
    /// order in which workers finish.
    pub fn count(&self, chunks: &[Chunk]) -> FrequencyTable {
        let workers = self.workers.min(chunks.len());
        if workers <= 1 {
            let mut table = FrequencyTable::new();
            for chunk in chunks {
                table.add_bytes(chunk.bytes());
            }
            return table;
        }

        let global = Mutex::new(FrequencyTable::new());

        thread::scope(|scope| {
            for worker in 0..workers {
                let global = &global;
                scope.spawn(move || {
                    let mut local = FrequencyTable::new();
                    for chunk in chunks.iter().skip(worker).step_by(workers) {
                        local.add_bytes(chunk.bytes());
                    }

                    log::trace!(
                        "count worker {worker}: {} bytes, {} distinct",
                        local.total(),
                        local.distinct()
                    );

                    // merge() cannot panic, so a poisoned table is still whole
                    let mut table = global.lock().unwrap_or_else(|e| e.into_inner());
                    table.merge(&local);
                });
            }
        });

        global.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}
