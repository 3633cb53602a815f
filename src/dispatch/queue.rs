//! # Bounded multi-worker task queue.
//!
//! [`DispatchQueue`] owns a bounded FIFO of [`Task`]s and a fixed pool of N
//! worker tasks pulling from it.
//!
//! ## Architecture
//! ```text
//! enqueue(task)
//!     │  reserve a slot (suspends while C tasks are pending)
//!     ▼
//! [ mpsc buffer, capacity C ] ◄── shared receiver (one worker receives at a time)
//!     │
//!     ├──► worker 0 ──► task.run() ──► Err / panic → warn!, continue
//!     ├──► worker 1 ──► task.run()
//!     └──► worker N-1
//! ```
//!
//! ## Rules
//! - **Backpressure**: `enqueue` suspends while the buffer is full; it fails
//!   only with [`DispatchError::Closed`].
//! - **Exactly once**: each task is received by one worker and run once; a
//!   failing or panicking task never stops its worker.
//! - **Ordering**: with one worker execution is FIFO; with more workers only
//!   dequeue order is FIFO, execution may interleave.
//! - **Close drains**: `close` stops intake, lets workers finish everything
//!   already buffered, then joins them. A second `close` is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatch::Task;
use crate::error::DispatchError;

/// Counters shared between the queue handle and its workers.
#[derive(Default)]
struct Shared {
    pending: AtomicUsize,
    executed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of queue counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks buffered but not yet started.
    pub pending: usize,
    /// Tasks that ran to completion without error.
    pub executed: u64,
    /// Tasks that returned an error or panicked.
    pub failed: u64,
    /// Configured buffer capacity.
    pub capacity: usize,
    /// Number of workers.
    pub workers: usize,
}

/// Bounded FIFO of tasks drained by a fixed worker pool.
pub struct DispatchQueue {
    sender: Mutex<Option<mpsc::Sender<Task>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shared: Arc<Shared>,
    capacity: usize,
    workers: usize,
}

impl DispatchQueue {
    /// Creates the queue and spawns `workers` long-lived workers.
    ///
    /// Both `workers` and `capacity` are clamped to a minimum of 1. `capacity`
    /// is also capped at [`Semaphore::MAX_PERMITS`](tokio::sync::Semaphore::MAX_PERMITS).
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new(workers: usize, capacity: usize) -> Self {
        let workers = workers.max(1);
        let capacity = capacity.clamp(1, tokio::sync::Semaphore::MAX_PERMITS);

        let (tx, rx) = mpsc::channel::<Task>(capacity);
        let rx = Arc::new(AsyncMutex::new(rx));
        let shared = Arc::new(Shared::default());

        let handles = (0..workers)
            .map(|id| tokio::spawn(worker_loop(id, Arc::clone(&rx), Arc::clone(&shared))))
            .collect();

        Self {
            sender: Mutex::new(Some(tx)),
            handles: Mutex::new(handles),
            shared,
            capacity,
            workers,
        }
    }

    fn sender(&self) -> Result<mpsc::Sender<Task>, DispatchError> {
        self.sender.lock().clone().ok_or(DispatchError::Closed)
    }

    /// Appends a task, suspending while the buffer is full.
    pub async fn enqueue(&self, task: Task) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let permit = tx.reserve().await.map_err(|_| DispatchError::Closed)?;
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        permit.send(task);
        Ok(())
    }

    /// Appends a task without waiting; fails with [`DispatchError::Full`] when saturated.
    pub fn try_enqueue(&self, task: Task) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let permit = tx.try_reserve().map_err(|e| match e {
            mpsc::error::TrySendError::Full(()) => DispatchError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(()) => DispatchError::Closed,
        })?;
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        permit.send(task);
        Ok(())
    }

    /// Appends a task from a thread outside the async runtime, blocking the
    /// thread while the buffer is full.
    ///
    /// Returns [`DispatchError::InsideRuntime`] when called from a runtime thread.
    pub fn blocking_enqueue(&self, task: Task) -> Result<(), DispatchError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(DispatchError::InsideRuntime);
        }
        futures::executor::block_on(self.enqueue(task))
    }

    /// Number of buffered tasks that no worker has started yet.
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of workers.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Returns current counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.len(),
            executed: self.shared.executed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
            capacity: self.capacity,
            workers: self.workers,
        }
    }

    /// Stops intake, runs every buffered task, then waits for all workers to exit.
    ///
    /// 1. Drops the queue's sender (new enqueues fail with `Closed`)
    /// 2. Workers drain the buffer and observe the channel closed
    /// 3. Awaits all worker handles
    pub async fn close(&self) -> Result<(), DispatchError> {
        drop(self.sender.lock().take());
        let handles = std::mem::take(&mut *self.handles.lock());

        let mut result = Ok(());
        for h in handles {
            if let Err(join_err) = h.await {
                result = Err(DispatchError::WorkerPanicked {
                    info: join_err.to_string(),
                });
            }
        }
        result
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Receives and runs tasks until the channel is closed and empty.
async fn worker_loop(id: usize, rx: Arc<AsyncMutex<mpsc::Receiver<Task>>>, shared: Arc<Shared>) {
    debug!(worker = id, "dispatch worker started");
    loop {
        let next = {
            let mut guard = rx.lock().await;
            guard.recv().await
        };
        let Some(task) = next else { break };
        shared.pending.fetch_sub(1, Ordering::AcqRel);

        let (name, res) = task.run().await;
        match res {
            Ok(()) => {
                shared.executed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                shared.failed.fetch_add(1, Ordering::Relaxed);
                warn!(worker = id, task = %name, label = err.as_label(), error = %err, "dispatch task failed");
            }
        }
    }
    debug!(worker = id, "dispatch worker stopped");
}
