//! Wire types for agent service resources
//!
//! Field names follow the service's JSON shape. Resources are owned by the
//! service; locally they are read-only snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

// ============================================================================
// Agents and tools
// ============================================================================

/// Tool made available to a remote agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    /// Locally executed function, dispatched by the run driver
    Function {
        /// Function signature
        function: FunctionDefinition,
    },
    /// Server-side code execution over attached files
    CodeInterpreter,
}

impl ToolDefinition {
    /// Create a function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self::Function {
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Signature of a function tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name (must match the local registry entry)
    pub name: String,
    /// What the function does, shown to the model
    pub description: String,
    /// JSON schema for the arguments
    pub parameters: Value,
}

/// Files made available to agent tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_interpreter: Option<CodeInterpreterResource>,
}

impl ToolResources {
    /// Resources granting the code interpreter access to the given files
    pub fn code_interpreter(file_ids: Vec<String>) -> Self {
        Self {
            code_interpreter: Some(CodeInterpreterResource { file_ids }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterResource {
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// Request body for creating an agent
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    /// Model deployment name
    pub model: String,
    pub name: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

/// Remote agent definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

// ============================================================================
// Threads and messages
// ============================================================================

/// Remote conversation context
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    /// The remote agent (reported by the service as `assistant`)
    #[serde(rename = "assistant", alias = "agent")]
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// File made available to the tools of a single message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: String,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

impl Attachment {
    /// Attach a file for use by the code interpreter
    pub fn code_interpreter(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            tools: vec![ToolDefinition::CodeInterpreter],
        }
    }
}

/// Request body for posting a message to a thread
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl CreateMessageRequest {
    /// User-authored message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Add attachments to the message
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Text content part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
}

/// Reference to a file produced by the agent (e.g. a rendered chart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFileContent {
    pub file_id: String,
}

/// One content part of a message
///
/// Parts of a type this client does not model are kept verbatim in
/// [`MessageContent::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MessageContent {
    Text(TextContent),
    ImageFile(ImageFileContent),
    Other(Value),
}

impl From<Value> for MessageContent {
    fn from(value: Value) -> Self {
        let parsed = match value.get("type").and_then(Value::as_str) {
            Some("text") => value
                .get("text")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .map(MessageContent::Text),
            Some("image_file") => value
                .get("image_file")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .map(MessageContent::ImageFile),
            _ => None,
        };
        parsed.unwrap_or(MessageContent::Other(value))
    }
}

impl From<MessageContent> for Value {
    fn from(content: MessageContent) -> Self {
        match content {
            MessageContent::Text(text) => json!({ "type": "text", "text": text }),
            MessageContent::ImageFile(image) => json!({ "type": "image_file", "image_file": image }),
            MessageContent::Other(value) => value,
        }
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageContent::Text(text) => write!(f, "{}", text.value),
            MessageContent::ImageFile(image) => write!(f, "[image file {}]", image.file_id),
            MessageContent::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Message in a thread
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl Message {
    /// Concatenated text of all text parts, or `None` if there are none
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text(t) => Some(t.value.as_str()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }

    /// IDs of all image files referenced by this message
    pub fn image_file_ids(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::ImageFile(img) => Some(img.file_id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Sort order for message listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Oldest first
    #[default]
    Asc,
    /// Newest first
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOrder::Asc => "asc",
            ListOrder::Desc => "desc",
        }
    }
}

/// Parameters for listing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListMessagesQuery {
    pub order: ListOrder,
    pub limit: Option<u32>,
}

impl ListMessagesQuery {
    /// All messages in creation order
    pub fn ascending() -> Self {
        Self {
            order: ListOrder::Asc,
            limit: None,
        }
    }

    /// Only the most recent message
    pub fn latest() -> Self {
        Self {
            order: ListOrder::Desc,
            limit: Some(1),
        }
    }
}

// ============================================================================
// Runs
// ============================================================================

/// Run status as reported by the service
///
/// The state machine is owned by the service. `Unknown` absorbs any status
/// this client does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the service will never advance the run again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function invocation requested by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// Pending tool call in a `requires_action` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn default_tool_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<RequiredToolCall>,
}

/// What the service needs before the run can continue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolOutputs {
        submit_tool_outputs: SubmitToolOutputs,
    },
    #[serde(other)]
    Unsupported,
}

/// Output of one tool call, submitted back to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolOutput {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }
}

/// Error reported by the service for a failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLastError {
    pub code: String,
    pub message: String,
}

impl fmt::Display for RunLastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// One execution of an agent against a thread
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    #[serde(rename = "assistant_id", alias = "agent_id", default)]
    pub agent_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunLastError>,
    #[serde(default)]
    pub created_at: i64,
}

impl Run {
    /// Pending tool calls, if the run is waiting for tool outputs
    pub fn pending_tool_calls(&self) -> Option<&[RequiredToolCall]> {
        match &self.required_action {
            Some(RequiredAction::SubmitToolOutputs {
                submit_tool_outputs,
            }) => Some(&submit_tool_outputs.tool_calls),
            _ => None,
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Intended use of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    /// Input for agents and their tools
    #[default]
    Assistants,
}

impl FilePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::Assistants => "assistants",
        }
    }
}

/// File to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub purpose: FilePurpose,
}

/// Uploaded file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}
