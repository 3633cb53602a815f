//! # Bounded asynchronous dispatch.
//!
//! Decouples event emission from rendering and listener execution, and bounds
//! the memory used by backlog.
//!
//! ## Contents
//! - [`Task`] named unit of work, captured by value at enqueue time
//! - [`DispatchQueue`] bounded FIFO drained by a fixed pool of workers
//! - [`QueueStats`] point-in-time counters
//!
//! ```text
//! producers ──► enqueue().await ──► [bounded mpsc, capacity C] ──► worker 1 ─► task.run()
//!                  (suspends when full)                     ├────► worker 2 ─► task.run()
//!                                                           └────► worker N ─► task.run()
//! ```

mod queue;
pub(crate) mod task;

pub use queue::{DispatchQueue, QueueStats};
pub use task::{BoxTaskFuture, Task};
