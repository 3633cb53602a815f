//! # Queued unit of work.
//!
//! A [`Task`] wraps a boxed future plus a name used in logs. Everything the
//! task needs (timestamp, kind, payload, writer handle) is moved into the
//! future when it is built, so nothing is read from shared state at execution
//! time except what the future itself captured.
//!
//! ## Example
//! ```rust
//! use diagvisor::{Task, TaskError};
//!
//! let t = Task::new("flush", async move {
//!     // async work...
//!     Ok::<(), TaskError>(())
//! });
//! assert_eq!(t.name(), "flush");
//!
//! let s = Task::from_fn("render", || Ok(()));
//! assert_eq!(s.name(), "render");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::TaskError;

/// Boxed future returned by a task.
pub type BoxTaskFuture = BoxFuture<'static, Result<(), TaskError>>;

/// Named unit of asynchronous work.
pub struct Task {
    name: Cow<'static, str>,
    fut: BoxTaskFuture,
}

impl Task {
    /// Creates a task from a future.
    pub fn new<Fut>(name: impl Into<Cow<'static, str>>, fut: Fut) -> Self
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            fut: Box::pin(fut),
        }
    }

    /// Creates a task from a synchronous closure.
    ///
    /// The closure runs on a worker; it must not block unboundedly.
    pub fn from_fn<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnOnce() -> Result<(), TaskError> + Send + 'static,
    {
        Self::new(name, async move { f() })
    }

    /// Task name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the task, converting a panic into [`TaskError::Panicked`].
    pub(crate) async fn run(self) -> (Cow<'static, str>, Result<(), TaskError>) {
        let Task { name, fut } = self;
        let res = match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(TaskError::Panicked {
                info: panic_message(&*panic_err),
            }),
        };
        (name, res)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_returns_result() {
        let (name, res) = Task::from_fn("ok", || Ok(())).run().await;
        assert_eq!(name, "ok");
        assert!(res.is_ok());

        let (_, res) = Task::new("fail", async { Err(TaskError::fail("nope")) })
            .run()
            .await;
        assert_eq!(res.unwrap_err().as_label(), "task_failed");
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let (_, res) = Task::from_fn("boom", || panic!("listener blew up")).run().await;
        match res {
            Err(TaskError::Panicked { info }) => assert_eq!(info, "listener blew up"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
