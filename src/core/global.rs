//! # Process-wide default agent.
//!
//! An optional handle for call sites that cannot receive an
//! [`Agent`](crate::Agent) explicitly. Nothing in the crate reads it on its
//! own; callers branch on `None` themselves.
//!
//! ## Rules
//! - `set_default` swaps under a mutex and returns the previous agent, so the
//!   caller can `close`/`drain` it.
//! - `is_enabled` on an absent default returns `false`.
//!
//! ```rust,no_run
//! use diagvisor::{Agent, AgentConfig, global};
//!
//! # async fn demo() {
//! let previous = global::set_default(Some(Agent::builder(AgentConfig::default()).build()));
//! if let Some(old) = previous {
//!     let _ = old.drain().await;
//! }
//! if let Some(agent) = global::default_agent() {
//!     agent.infof("ready").await;
//! }
//! # }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::Agent;
use crate::events::EventKind;

static DEFAULT: Mutex<Option<Arc<Agent>>> = parking_lot::const_mutex(None);

/// Installs (or clears, with `None`) the default agent; returns the previous one.
pub fn set_default(agent: Option<Arc<Agent>>) -> Option<Arc<Agent>> {
    std::mem::replace(&mut *DEFAULT.lock(), agent)
}

/// Returns the default agent, if one is installed.
pub fn default_agent() -> Option<Arc<Agent>> {
    DEFAULT.lock().clone()
}

/// True if a default agent is installed and has `kind` enabled.
pub fn is_enabled(kind: EventKind) -> bool {
    DEFAULT.lock().as_ref().is_some_and(|agent| agent.is_enabled(kind))
}
