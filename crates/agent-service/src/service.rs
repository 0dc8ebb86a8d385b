//! Agent service trait definition

use crate::{
    Agent, CreateAgentRequest, CreateMessageRequest, FileObject, FileUpload, ListMessagesQuery,
    Message, Result, Run, Thread, ToolOutput,
};
use async_trait::async_trait;

/// Operations consumed from the hosted agent service
///
/// The service owns every resource and the run state machine; implementations
/// only issue requests and decode responses. Nothing here retries.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Create an agent
    async fn create_agent(&self, request: CreateAgentRequest) -> Result<Agent>;

    /// Delete an agent
    async fn delete_agent(&self, agent_id: &str) -> Result<()>;

    /// Create an empty conversation thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Post a message to a thread
    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> Result<Message>;

    /// List messages of a thread
    async fn list_messages(&self, thread_id: &str, query: ListMessagesQuery)
    -> Result<Vec<Message>>;

    /// Start a run of `agent_id` over the thread
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Answer the pending tool calls of a run in one batch
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run>;

    /// Ask the service to cancel a run
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Upload a file
    async fn upload_file(&self, upload: FileUpload) -> Result<FileObject>;

    /// Delete an uploaded file
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Download the raw bytes of a file
    async fn file_content(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Get the service name (for logging)
    fn name(&self) -> &str;
}
