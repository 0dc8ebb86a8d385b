//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;

/// Trait for functions that a remote agent can call
///
/// The contract is fixed: JSON arguments in, a string out. A tool never
/// fails past its own boundary. Problems are reported inside the returned
/// string, which is handed back to the agent as the call's output so the
/// agent can reason about them.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Run the function
    ///
    /// # Arguments
    ///
    /// * `arguments` - Parsed call arguments (should match `parameters`)
    async fn call(&self, arguments: Value) -> String;

    /// Get the function's name
    ///
    /// Must be unique within a FunctionRegistry and match the name the agent
    /// was given in its tool definitions
    fn name(&self) -> &str;

    /// Get the function's description
    ///
    /// This description helps the model understand when to call the function
    fn description(&self) -> &str;

    /// Get the function's parameter schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use agent_tools::schema;
    /// use serde_json::json;
    ///
    /// let parameters = schema::object(
    ///     json!({ "ticker": schema::string("Stock ticker symbol") }),
    ///     vec!["ticker"],
    /// );
    /// assert_eq!(parameters["required"][0], "ticker");
    /// ```
    fn parameters(&self) -> Value;
}
