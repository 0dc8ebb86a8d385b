//! HTTP implementation of the agent service
//!
//! Speaks the assistants-style REST API exposed by the hosted agent service.
//! Every request carries the configured `api-version` query parameter and,
//! when configured, a bearer token.
//!
//! # Example
//!
//! ```no_run
//! use agent_service::{AgentService, AgentServiceConfig, HttpAgentService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpAgentService::from_env()?;
//!     let thread = service.create_thread().await?;
//!     println!("Created thread {}", thread.id);
//!     Ok(())
//! }
//! ```

use crate::{
    Agent, AgentService, AgentServiceConfig, CreateAgentRequest, CreateMessageRequest,
    FileObject, FileUpload, ListMessagesQuery, Message, Result, Run, ServiceError, Thread,
    ToolOutput,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// `reqwest`-backed agent service client
pub struct HttpAgentService {
    client: Client,
    config: AgentServiceConfig,
}

impl HttpAgentService {
    /// Create a client with custom configuration
    pub fn with_config(config: AgentServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    ///
    /// See [`AgentServiceConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::with_config(AgentServiceConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &AgentServiceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .query(&[("api-version", self.config.api_version.as_str())]);

        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|e| {
            ServiceError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })
    }

    async fn delete_resource(&self, path: &str) -> Result<()> {
        let status: DeletionStatus = self.send_json(self.request(Method::DELETE, path)).await?;
        if status.deleted {
            Ok(())
        } else {
            Err(ServiceError::UnexpectedResponse(format!(
                "Service did not delete {}",
                status.id
            )))
        }
    }
}

/// Map non-success HTTP statuses to typed errors
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => ServiceError::AuthenticationFailed(error_text),
        404 => ServiceError::NotFound(error_text),
        429 => ServiceError::RateLimitExceeded(error_text),
        400 => ServiceError::InvalidRequest(error_text),
        _ => ServiceError::RequestFailed(format!("HTTP {status}: {error_text}")),
    })
}

#[async_trait]
impl AgentService for HttpAgentService {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn create_agent(&self, request: CreateAgentRequest) -> Result<Agent> {
        debug!(tool_count = request.tools.len(), "Creating agent");
        self.send_json(self.request(Method::POST, "assistants").json(&request))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        self.delete_resource(&format!("assistants/{agent_id}")).await
    }

    #[instrument(skip(self))]
    async fn create_thread(&self) -> Result<Thread> {
        self.send_json(self.request(Method::POST, "threads").json(&json!({})))
            .await
    }

    #[instrument(skip(self, request), fields(attachments = request.attachments.len()))]
    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> Result<Message> {
        self.send_json(
            self.request(Method::POST, &format!("threads/{thread_id}/messages"))
                .json(&request),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> Result<Vec<Message>> {
        let path = format!("threads/{thread_id}/messages");
        let mut messages = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut builder = self
                .request(Method::GET, &path)
                .query(&[("order", query.order.as_str())]);
            if let Some(limit) = query.limit {
                builder = builder.query(&[("limit", limit)]);
            }
            if let Some(cursor) = &after {
                builder = builder.query(&[("after", cursor.as_str())]);
            }

            let page: ListResponse<Message> = self.send_json(builder).await?;
            pages += 1;
            let cursor = page
                .last_id
                .or_else(|| page.data.last().map(|m| m.id.clone()));
            messages.extend(page.data);

            // A limited query asks for one page only
            if query.limit.is_some() || !page.has_more {
                break;
            }
            match cursor {
                Some(cursor) if after.as_deref() != Some(cursor.as_str()) => after = Some(cursor),
                _ => {
                    warn!(thread_id = %thread_id, "Message list reports more pages without a cursor");
                    break;
                }
            }
        }

        debug!(count = messages.len(), pages = pages, "Listed messages");
        Ok(messages)
    }

    #[instrument(skip(self))]
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run> {
        self.send_json(
            self.request(Method::POST, &format!("threads/{thread_id}/runs"))
                .json(&json!({ "assistant_id": agent_id })),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.send_json(self.request(Method::GET, &format!("threads/{thread_id}/runs/{run_id}")))
            .await
    }

    #[instrument(skip(self, outputs), fields(output_count = outputs.len()))]
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run> {
        self.send_json(
            self.request(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            )
            .json(&json!({ "tool_outputs": outputs })),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.send_json(self.request(
            Method::POST,
            &format!("threads/{thread_id}/runs/{run_id}/cancel"),
        ))
        .await
    }

    #[instrument(skip(self, upload), fields(filename = %upload.filename, size = upload.bytes.len()))]
    async fn upload_file(&self, upload: FileUpload) -> Result<FileObject> {
        let part = multipart::Part::bytes(upload.bytes).file_name(upload.filename);
        let form = multipart::Form::new()
            .text("purpose", upload.purpose.as_str())
            .part("file", part);

        self.send_json(self.request(Method::POST, "files").multipart(form))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.delete_resource(&format!("files/{file_id}")).await
    }

    #[instrument(skip(self))]
    async fn file_content(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .send(self.request(Method::GET, &format!("files/{file_id}/content")))
            .await?;
        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Downloaded file content");
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct DeletionStatus {
    id: String,
    deleted: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attachment, FilePurpose, Role, RunStatus, ToolDefinition};
    use wiremock::matchers::{
        body_json, header, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> HttpAgentService {
        let config = AgentServiceConfig::new(server.uri())
            .with_api_version("test-version")
            .with_access_token("test-token");
        HttpAgentService::with_config(config).unwrap()
    }

    fn run_json(status: &str) -> serde_json::Value {
        json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": status
        })
    }

    #[test]
    fn test_url_joining() {
        let service =
            HttpAgentService::with_config(AgentServiceConfig::new("http://localhost:1/base/"))
                .unwrap();
        assert_eq!(service.url("/threads"), "http://localhost:1/base/threads");
        assert_eq!(service.url("threads/t1/runs"), "http://localhost:1/base/threads/t1/runs");
        assert_eq!(service.name(), "http");
    }

    #[tokio::test]
    async fn test_create_thread_sends_version_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(query_param("api-version", "test-version"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1", "created_at": 1 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let thread = service.create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_1");
    }

    #[tokio::test]
    async fn test_create_message_with_attachment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_json(json!({
                "role": "user",
                "content": "Show a pie chart of my investments",
                "attachments": [{ "file_id": "file_csv", "tools": [{ "type": "code_interpreter" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "thread_id": "thread_1",
                "role": "user",
                "content": [{ "type": "text", "text": { "value": "Show a pie chart of my investments", "annotations": [] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let request = CreateMessageRequest::user("Show a pie chart of my investments")
            .with_attachments(vec![Attachment::code_interpreter("file_csv")]);
        let message = service.create_message("thread_1", request).await.unwrap();

        assert_eq!(message.role, Role::User);
        assert_eq!(message.text().as_deref(), Some("Show a pie chart of my investments"));
    }

    #[tokio::test]
    async fn test_list_messages_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("order", "desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{
                    "id": "msg_9",
                    "role": "assistant",
                    "content": [{ "type": "text", "text": { "value": "Sorry, I failed", "annotations": [] } }]
                }],
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let messages = service
            .list_messages("thread_1", ListMessagesQuery::latest())
            .await
            .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Agent);
        assert_eq!(messages[0].text().as_deref(), Some("Sorry, I failed"));
    }

    #[tokio::test]
    async fn test_list_messages_reads_every_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("order", "asc"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{
                    "id": "msg_1",
                    "role": "user",
                    "content": [{ "type": "text", "text": { "value": "What is the latest closing price for Microsoft?", "annotations": [] } }]
                }],
                "first_id": "msg_1",
                "last_id": "msg_1",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("order", "asc"))
            .and(query_param("after", "msg_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{
                    "id": "msg_2",
                    "role": "assistant",
                    "content": [{ "type": "text", "text": { "value": "412.345", "annotations": [] } }]
                }],
                "first_id": "msg_2",
                "last_id": "msg_2",
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let messages = service
            .list_messages("thread_1", ListMessagesQuery::ascending())
            .await
            .unwrap();

        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["msg_1", "msg_2"]);
        assert_eq!(messages[1].text().as_deref(), Some("412.345"));
    }

    #[tokio::test]
    async fn test_create_and_get_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_json(json!({ "assistant_id": "asst_1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("in_progress")))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let run = service.create_run("thread_1", "asst_1").await.unwrap();
        assert_eq!(run.status, RunStatus::Queued);

        let run = service.get_run("thread_1", "run_1").await.unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
    }

    #[tokio::test]
    async fn test_submit_tool_outputs_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
            .and(body_json(json!({
                "tool_outputs": [{ "tool_call_id": "call_1", "output": "412.345" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued")))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let run = service
            .submit_tool_outputs("thread_1", "run_1", vec![ToolOutput::new("call_1", "412.345")])
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn test_create_agent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_1",
                "name": "portfolio-agent",
                "model": "gpt-4o-mini",
                "instructions": "You are a helpful agent",
                "tools": [{ "type": "code_interpreter" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let agent = service
            .create_agent(CreateAgentRequest {
                model: "gpt-4o-mini".to_string(),
                name: "portfolio-agent".to_string(),
                instructions: "You are a helpful agent".to_string(),
                tools: vec![ToolDefinition::CodeInterpreter],
                tool_resources: None,
            })
            .await
            .unwrap();

        assert_eq!(agent.id, "asst_1");
        assert_eq!(agent.tools, vec![ToolDefinition::CodeInterpreter]);
    }

    #[tokio::test]
    async fn test_delete_agent_not_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/assistants/asst_1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "asst_1", "object": "assistant.deleted", "deleted": false })),
            )
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.delete_agent("asst_1").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_and_download_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file_csv",
                "filename": "portfolio.csv",
                "purpose": "assistants",
                "bytes": 42
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/file_img/content"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/files/file_csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "file_csv", "deleted": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let file = service
            .upload_file(FileUpload {
                filename: "portfolio.csv".to_string(),
                bytes: b"symbol,average_cost,quantity\n".to_vec(),
                purpose: FilePurpose::Assistants,
            })
            .await
            .unwrap();
        assert_eq!(file.id, "file_csv");
        assert_eq!(file.bytes, Some(42));

        let bytes = service.file_content("file_img").await.unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);

        service.delete_file("file_csv").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/t_auth/runs/r"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t_missing/runs/r"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such run"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t_busy/runs/r"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/t_broken/runs/r"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let service = service_for(&server).await;

        let err = service.get_run("t_auth", "r").await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthenticationFailed(ref m) if m == "bad token"));

        let err = service.get_run("t_missing", "r").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.get_run("t_busy", "r").await.unwrap_err();
        assert!(matches!(err, ServiceError::RateLimitExceeded(_)));

        let err = service.get_run("t_broken", "r").await.unwrap_err();
        match err {
            ServiceError::RequestFailed(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("Expected RequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service.create_thread().await.unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedResponse(_)));
    }
}
