//! Chunk encoding on a fixed pool of worker threads.
//!
//! # Design
//!
//! - **Queue**: an `mpsc` channel whose receiver is shared by all workers
//!   behind a mutex. Each worker locks it only long enough to take one chunk.
//! - **Shutdown**: dropping the sender closes the channel. Workers keep
//!   draining until the queue is both closed and empty, then exit.
//! - **Ordering**: results are stored keyed by chunk index, so the order in
//!   which workers finish does not matter.
//! - **Failure**: the first encoding error raises an abort flag. Remaining
//!   chunks are drained without being encoded and `finish` reports the error
//!   instead of any partial output.
//!
//! The [`CodeMapping`] is shared through an `Arc` and never locked.

use crate::bitio::BitWriter;
use crate::chunk::{Chunk, EncodedChunk};
use crate::error::{Error, HuffmanError, Result, WorkerPoolError};
use crate::huffman::CodeMapping;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Encode one chunk by concatenating the codeword of every byte.
///
/// # Errors
/// Returns `HuffmanError::InconsistentCodeMapping` if a byte has no codeword.
pub fn encode_chunk(chunk: &Chunk, codes: &CodeMapping) -> Result<EncodedChunk> {
    let mut writer = BitWriter::with_capacity(chunk.len());

    for &symbol in chunk.bytes() {
        let code = codes
            .get(symbol)
            .ok_or(HuffmanError::InconsistentCodeMapping {
                symbol,
                chunk: chunk.index,
            })?;
        writer.write_bits(code.bits(), code.len() as usize)?;
    }

    Ok(EncodedChunk {
        index: chunk.index,
        symbols: chunk.len(),
        bits: writer.into_bits(),
    })
}

/// Encode `chunks` on a pool of `workers` threads and return the results in
/// index order.
pub fn encode_chunks(
    chunks: impl IntoIterator<Item = Chunk>,
    codes: Arc<CodeMapping>,
    workers: usize,
) -> Result<Vec<EncodedChunk>> {
    let mut pool = WorkerPool::new(workers, codes)?;
    for chunk in chunks {
        pool.submit(chunk)?;
    }
    pool.finish()
}

/// State shared between the pool handle and its workers.
struct Shared {
    codes: Arc<CodeMapping>,
    output: Mutex<BTreeMap<usize, EncodedChunk>>,
    failure: Mutex<Option<Error>>,
    aborted: AtomicBool,
}

impl Shared {
    fn record(&self, encoded: EncodedChunk) {
        let index = encoded.index;
        let duplicate = self
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(index, encoded)
            .is_some();

        if duplicate {
            self.fail(WorkerPoolError::DuplicateChunk { index }.into());
        }
    }

    /// Keep the first error only.
    fn fail(&self, error: Error) {
        self.aborted.store(true, Ordering::Release);
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if failure.is_none() {
            *failure = Some(error);
        }
    }
}

struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

impl Worker {
    fn spawn(id: usize, queue: Arc<Mutex<Receiver<Chunk>>>, shared: Arc<Shared>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("parhuff-encode-{id}"))
            .spawn(move || Self::run(id, &queue, &shared))
            .map_err(|source| WorkerPoolError::Spawn { worker: id, source })?;

        Ok(Self { id, handle })
    }

    fn run(id: usize, queue: &Mutex<Receiver<Chunk>>, shared: &Shared) {
        loop {
            // The guard is released at the end of this statement, before encoding.
            let message = queue.lock().unwrap_or_else(PoisonError::into_inner).recv();

            let Ok(chunk) = message else {
                log::trace!("encode worker {id}: queue closed, exiting");
                return;
            };

            if shared.aborted.load(Ordering::Acquire) {
                continue;
            }

            #[cfg(test)]
            if chunk.index == tests::PANIC_INDEX {
                panic!("encode worker {id}: injected panic");
            }

            match encode_chunk(&chunk, &shared.codes) {
                Ok(encoded) => {
                    log::trace!(
                        "encode worker {id}: chunk {} ({} bytes -> {} bits)",
                        chunk.index,
                        chunk.len(),
                        encoded.bits.len()
                    );
                    shared.record(encoded);
                }
                Err(e) => {
                    log::debug!("encode worker {id}: chunk {} failed: {e}", chunk.index);
                    shared.fail(e);
                }
            }
        }
    }
}

/// A fixed-size pool of encoding threads fed through a FIFO queue.
///
/// Threads start in [`WorkerPool::new`]. Chunks may be submitted while the
/// workers are already encoding; [`WorkerPool::finish`] closes the queue,
/// waits for every worker to exit and returns the results ordered by index.
pub struct WorkerPool {
    sender: Option<Sender<Chunk>>,
    workers: Vec<Worker>,
    shared: Arc<Shared>,
    submitted: BTreeSet<usize>,
}

impl WorkerPool {
    /// Start `workers` threads encoding with `codes`.
    ///
    /// # Errors
    /// - `Error::Config` if `workers` is zero
    /// - `WorkerPoolError::Spawn` if a thread cannot be started
    pub fn new(workers: usize, codes: Arc<CodeMapping>) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("encoding workers must be positive".into()));
        }

        let (sender, receiver) = mpsc::channel();
        let queue = Arc::new(Mutex::new(receiver));
        let shared = Arc::new(Shared {
            codes,
            output: Mutex::new(BTreeMap::new()),
            failure: Mutex::new(None),
            aborted: AtomicBool::new(false),
        });

        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(workers),
            shared,
            submitted: BTreeSet::new(),
        };

        // On a spawn failure, dropping `pool` shuts down the threads already started
        for id in 0..workers {
            let worker = Worker::spawn(id, Arc::clone(&queue), Arc::clone(&pool.shared))?;
            pool.workers.push(worker);
        }

        log::debug!("worker pool started with {workers} threads");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a chunk for encoding.
    ///
    /// # Errors
    /// - `WorkerPoolError::DuplicateChunk` if a chunk with the same index was
    ///   already submitted
    /// - `WorkerPoolError::QueueClosed` if no worker is left to receive it
    pub fn submit(&mut self, chunk: Chunk) -> Result<()> {
        let index = chunk.index;
        if !self.submitted.insert(index) {
            return Err(WorkerPoolError::DuplicateChunk { index }.into());
        }

        let sender = self.sender.as_ref().ok_or(WorkerPoolError::QueueClosed)?;
        sender
            .send(chunk)
            .map_err(|_| WorkerPoolError::QueueClosed)?;
        Ok(())
    }

    /// Close the queue, join every worker and return the encoded chunks in
    /// index order.
    ///
    /// # Errors
    /// - The first encoding error raised by any worker
    /// - `WorkerPoolError::JoinFailure` if a worker panicked
    /// - `WorkerPoolError::MissingChunk` if a submitted chunk has no result
    pub fn finish(mut self) -> Result<Vec<EncodedChunk>> {
        let join_failure = self.shutdown();

        let failure = self
            .shared
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(error) = failure {
            return Err(error);
        }
        if let Some(worker) = join_failure {
            return Err(WorkerPoolError::JoinFailure { worker }.into());
        }

        let mut output = std::mem::take(
            &mut *self
                .shared
                .output
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let encoded = std::mem::take(&mut self.submitted)
            .into_iter()
            .map(|index| {
                output
                    .remove(&index)
                    .ok_or_else(|| WorkerPoolError::MissingChunk { index }.into())
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("worker pool finished: {} chunks encoded", encoded.len());
        Ok(encoded)
    }

    /// Drop the sender and join all workers. Returns the id of the first
    /// worker that panicked, if any.
    fn shutdown(&mut self) -> Option<usize> {
        drop(self.sender.take());

        let mut first_failure = None;
        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                log::debug!("encode worker {} panicked", worker.id);
                first_failure.get_or_insert(worker.id);
            }
        }
        first_failure
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
