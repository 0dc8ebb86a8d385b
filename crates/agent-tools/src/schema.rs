//! Helpers to build JSON schemas for function parameters

use serde_json::{Value, json};

/// Create a JSON schema for an object with properties
///
/// # Example
///
/// ```
/// use agent_tools::schema;
/// use serde_json::json;
///
/// let schema = schema::object(
///     json!({
///         "ticker": schema::string("Stock ticker symbol"),
///     }),
///     vec!["ticker"],
/// );
/// assert_eq!(schema["type"], "object");
/// ```
pub fn object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// String property schema
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}
