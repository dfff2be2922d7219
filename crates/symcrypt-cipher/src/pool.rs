//! Bounded rayon worker pool for per-block tasks
//!
//! The pool is sized up front but its threads are only spawned on the first
//! parallel dispatch, so façades built for sequential modes never start any.
//! Shutdown drops the pool and then waits (bounded) for every worker to
//! report its exit.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use symcrypt_core::{SymcryptError, SymcryptResult};
use tracing::{debug, info, warn};

enum PoolState {
    Idle,
    Running {
        pool: Arc<rayon::ThreadPool>,
        exits: Receiver<usize>,
    },
    Closed,
}

pub struct BlockPool {
    workers: usize,
    state: Mutex<PoolState>,
}

impl BlockPool {
    /// `workers` is clamped to at least one thread.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            state: Mutex::new(PoolState::Idle),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether worker threads have been spawned and not yet shut down.
    pub fn is_running(&self) -> bool {
        matches!(*self.lock(), PoolState::Running { .. })
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self) -> SymcryptResult<Arc<rayon::ThreadPool>> {
        let mut state = self.lock();
        match &*state {
            PoolState::Running { pool, .. } => return Ok(Arc::clone(pool)),
            PoolState::Closed => {
                return Err(SymcryptError::Config("worker pool already shut down".into()))
            }
            PoolState::Idle => {}
        }

        let (tx, exits) = mpsc::channel();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("symcrypt-block-{i}"))
            .exit_handler(move |index| {
                let _ = tx.send(index);
            })
            .build()
            .map_err(|e| SymcryptError::Other(anyhow::anyhow!("building worker pool: {e}")))?;
        let pool = Arc::new(pool);
        info!(workers = self.workers, "block worker pool started");

        *state = PoolState::Running {
            pool: Arc::clone(&pool),
            exits,
        };
        Ok(pool)
    }

    /// Run `task(index, block)` for every `block_size` chunk of `data`, in any
    /// order and on any worker, and return once all of them have finished.
    ///
    /// Chunks are disjoint, so tasks write without further locking. The first
    /// failing (or panicking) task aborts the call with `OperationFailed`.
    pub fn for_each_block<F>(&self, data: &mut [u8], block_size: usize, task: F) -> SymcryptResult<()>
    where
        F: Fn(usize, &mut [u8]) -> SymcryptResult<()> + Send + Sync,
    {
        if data.is_empty() {
            return Ok(());
        }
        let pool = self.handle()?;
        debug!(
            blocks = data.len() / block_size,
            workers = self.workers,
            "dispatching block tasks"
        );

        pool.install(|| {
            data.par_chunks_mut(block_size)
                .enumerate()
                .try_for_each(|(index, block)| {
                    match panic::catch_unwind(AssertUnwindSafe(|| task(index, block))) {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(SymcryptError::task_failed(index, e)),
                        Err(payload) => Err(SymcryptError::task_failed(
                            index,
                            format!("block task panicked: {}", panic_message(&*payload)),
                        )),
                    }
                })
        })
    }

    /// Stop the workers: release the pool, then wait up to `timeout` for all
    /// threads to exit. Threads still busy after the deadline are detached and
    /// reported as `ResourceShutdown`. Calling this more than once is a no-op.
    pub fn shutdown(&self, timeout: Duration) -> SymcryptResult<()> {
        let previous = std::mem::replace(&mut *self.lock(), PoolState::Closed);
        let PoolState::Running { pool, exits } = previous else {
            return Ok(());
        };
        drop(pool);

        let deadline = Instant::now() + timeout;
        let mut pending = self.workers;
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match exits.recv_timeout(remaining) {
                Ok(_) => pending -= 1,
                Err(RecvTimeoutError::Disconnected) => pending = 0,
                Err(RecvTimeoutError::Timeout) => break,
            }
        }

        if pending > 0 {
            warn!(pending, ?timeout, "worker pool did not stop in time; detaching workers");
            return Err(SymcryptError::ResourceShutdown { pending, timeout });
        }
        info!(workers = self.workers, "block worker pool stopped");
        Ok(())
    }
}

impl std::fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("workers", &self.workers)
            .field("running", &self.is_running())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
