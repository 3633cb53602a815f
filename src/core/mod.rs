//! Agent core: configuration, construction and the emission API.
//!
//! The only types most callers need from here are [`Agent`], [`AgentBuilder`]
//! and [`AgentConfig`].
//!
//! ## Wiring
//! ```text
//! AgentBuilder::new(AgentConfig)
//!     .with_writer(Arc<dyn Writer>)
//!     .with_listener(kind, listener)
//!     .build() ──► Arc<Agent>
//!                    ├─ EventFlagSet        (atomic, gates every emission)
//!                    ├─ ListenerRegistry    (kind → Arc<[Listener]>)
//!                    ├─ Option<Arc<Writer>> (shared with the caller)
//!                    └─ DispatchQueue       (bounded, N workers)
//!
//! agent.infof / errorf / error(result) / on_event
//!     └─► enabled? ─► write task + trigger task ─► DispatchQueue ─► workers
//!
//! agent.drain()  ─► flags = none ─► wait len()==0 ─► close() ─► join workers
//! ```
//!
//! Internal modules:
//! - `agent`: emission API and shutdown;
//! - `builder`: assembles an agent from its config;
//! - `config`: [`AgentConfig`] and its defaults;
//! - [`global`]: optional process-wide default agent.

mod agent;
mod builder;
mod config;
pub mod global;

pub use agent::{Agent, AgentStats};
pub use builder::AgentBuilder;
pub use config::{AgentConfig, DEFAULT_DRAIN_POLL, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
