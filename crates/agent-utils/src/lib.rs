//! Shared utilities for the portfolio agent workspace
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-based configuration helpers.

pub mod env;
pub mod logging;

pub use env::{EnvError, load_env_file, optional_var, required_var};
pub use logging::{init_tracing, init_tracing_with_default};
