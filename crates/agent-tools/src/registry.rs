//! Immutable registry of callable functions

use crate::Tool;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while dispatching a tool call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The agent asked for a function that was never registered
    #[error("Unknown function requested: {0}")]
    UnknownFunction(String),
}

/// Name → function mapping, fixed at construction
///
/// Built once at startup through [`FunctionRegistry::builder`] and shared
/// read-only afterwards.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl FunctionRegistry {
    /// Start building a registry
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check whether a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered function names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// All registered functions, sorted by name
    ///
    /// Useful for building the tool definitions handed to the agent.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve and run one tool call
    ///
    /// `arguments` is the JSON-encoded payload sent by the agent. An empty
    /// payload is treated as `{}`. A payload that is not valid JSON does not
    /// reach the function; the returned output describes the parse failure
    /// instead.
    ///
    /// An unregistered `name` is always an error.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, DispatchError> {
        let tool = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownFunction(name.to_string()))?;

        let parsed = if arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str::<Value>(arguments) {
                Ok(value) => value,
                Err(e) => {
                    warn!(function = %name, error = %e, "Tool call arguments are not valid JSON");
                    return Ok(format!("Error: invalid arguments for {name}: {e}"));
                }
            }
        };

        debug!(function = %name, "Calling function");
        Ok(tool.call(parsed).await)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Builder for FunctionRegistry
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl FunctionRegistryBuilder {
    /// Register a function
    ///
    /// Registering a second function under the same name replaces the first.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(function = %name, "Function registered twice, keeping the latest");
        }
        self
    }

    /// Freeze the registry
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry { tools: self.tools }
    }
}
