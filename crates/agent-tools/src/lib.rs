//! Local function tools for agent runs
//!
//! This crate provides the [`Tool`] trait for functions the remote agent may
//! call, and the immutable [`FunctionRegistry`] that resolves tool calls to
//! them.

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::{DispatchError, FunctionRegistry, FunctionRegistryBuilder};
pub use tool::Tool;
