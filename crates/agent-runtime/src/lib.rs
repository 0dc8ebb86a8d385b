//! Runtime for driving runs of a hosted agent
//!
//! This crate provides the runtime side of a conversation with a remote
//! agent: the [`RunDriver`] that submits a user message and polls the run to
//! a terminal outcome (answering tool calls from a local
//! [`agent_tools::FunctionRegistry`] on the way), the [`ContentDispatcher`]
//! that renders the resulting messages, and the [`Session`] that owns the
//! remote resources for their lifetime.

pub mod config;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export key types
pub use config::{PollPolicy, PollPolicyBuilder, SessionConfig, SessionConfigBuilder};
pub use dispatcher::{ContentDispatcher, DispatchedContent, ImageRenderer, LogRenderer};
pub use driver::{NoOpObserver, RunDriver, RunObserver, RunOutcome};
pub use error::{Result, RunError};
pub use session::Session;
