//! Scripted in-memory agent service for tests

use agent_service::{
    Agent, AgentService, CreateAgentRequest, CreateMessageRequest, FileObject, FileUpload,
    FunctionCall, ImageFileContent, ListMessagesQuery, ListOrder, Message, MessageContent,
    RequiredAction, RequiredToolCall, Role, Run, RunStatus, ServiceError, SubmitToolOutputs,
    TextContent, Thread, ToolOutput,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const THREAD_ID: &str = "thread_1";
pub const RUN_ID: &str = "run_1";
pub const AGENT_ID: &str = "agent_1";

pub fn run(status: RunStatus) -> Run {
    Run {
        id: RUN_ID.to_string(),
        thread_id: THREAD_ID.to_string(),
        agent_id: AGENT_ID.to_string(),
        status,
        required_action: None,
        last_error: None,
        created_at: 0,
    }
}

/// A `requires_action` run asking for `(call_id, function, arguments)` calls
pub fn run_requiring(calls: &[(&str, &str, &str)]) -> Run {
    let tool_calls = calls
        .iter()
        .map(|(id, name, arguments)| RequiredToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        })
        .collect();

    Run {
        required_action: Some(RequiredAction::SubmitToolOutputs {
            submit_tool_outputs: SubmitToolOutputs { tool_calls },
        }),
        ..run(RunStatus::RequiresAction)
    }
}

pub fn text_message(id: &str, role: Role, text: &str) -> Message {
    message(
        id,
        role,
        vec![MessageContent::Text(TextContent {
            value: text.to_string(),
            annotations: Vec::new(),
        })],
    )
}

pub fn image_message(id: &str, file_id: &str) -> Message {
    message(
        id,
        Role::Agent,
        vec![MessageContent::ImageFile(ImageFileContent {
            file_id: file_id.to_string(),
        })],
    )
}

pub fn message(id: &str, role: Role, content: Vec<MessageContent>) -> Message {
    Message {
        id: id.to_string(),
        thread_id: Some(THREAD_ID.to_string()),
        role,
        content,
        attachments: Vec::new(),
        run_id: Some(RUN_ID.to_string()),
        created_at: 0,
    }
}

/// Agent service replaying a fixed sequence of run states
///
/// Each `get_run` pops the next scripted state; once the script is exhausted
/// the last state repeats. Every call is recorded by name.
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<VecDeque<Run>>,
    last: Mutex<Option<Run>>,
    messages: Mutex<Vec<Message>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<Vec<ToolOutput>>>,
    pub posted: Mutex<Vec<CreateMessageRequest>>,
    pub agents: Mutex<Vec<CreateAgentRequest>>,
    pub uploads: Mutex<Vec<FileUpload>>,
    fail_delete_agent: bool,
    fail_create_thread: bool,
}

impl ScriptedService {
    pub fn new(script: Vec<Run>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn with_messages(self, messages: Vec<Message>) -> Self {
        *self.messages.lock().unwrap() = messages;
        self
    }

    pub fn with_file(self, file_id: &str, bytes: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), bytes.to_vec());
        self
    }

    pub fn failing_delete_agent(mut self) -> Self {
        self.fail_delete_agent = true;
        self
    }

    pub fn failing_create_thread(mut self) -> Self {
        self.fail_create_thread = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl AgentService for ScriptedService {
    async fn create_agent(&self, request: CreateAgentRequest) -> agent_service::Result<Agent> {
        self.record("create_agent");
        let agent = Agent {
            id: AGENT_ID.to_string(),
            name: Some(request.name.clone()),
            model: request.model.clone(),
            instructions: Some(request.instructions.clone()),
            tools: request.tools.clone(),
        };
        self.agents.lock().unwrap().push(request);
        Ok(agent)
    }

    async fn delete_agent(&self, _agent_id: &str) -> agent_service::Result<()> {
        self.record("delete_agent");
        if self.fail_delete_agent {
            return Err(ServiceError::RequestFailed("HTTP 500: boom".to_string()));
        }
        Ok(())
    }

    async fn create_thread(&self) -> agent_service::Result<Thread> {
        self.record("create_thread");
        if self.fail_create_thread {
            return Err(ServiceError::RateLimitExceeded("slow down".to_string()));
        }
        Ok(Thread {
            id: THREAD_ID.to_string(),
            created_at: 0,
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> agent_service::Result<Message> {
        self.record("create_message");
        let mut message = text_message("msg_user", request.role, &request.content);
        message.thread_id = Some(thread_id.to_string());
        message.attachments = request.attachments.clone();
        self.posted.lock().unwrap().push(request);
        Ok(message)
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        query: ListMessagesQuery,
    ) -> agent_service::Result<Vec<Message>> {
        self.record("list_messages");
        let mut messages = self.messages.lock().unwrap().clone();
        if query.order == ListOrder::Desc {
            messages.reverse();
        }
        if let Some(limit) = query.limit {
            messages.truncate(limit as usize);
        }
        Ok(messages)
    }

    async fn create_run(&self, _thread_id: &str, _agent_id: &str) -> agent_service::Result<Run> {
        self.record("create_run");
        Ok(run(RunStatus::Queued))
    }

    async fn get_run(&self, _thread_id: &str, _run_id: &str) -> agent_service::Result<Run> {
        self.record("get_run");
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = next {
            *last = Some(next);
        }
        last.clone()
            .ok_or_else(|| ServiceError::NotFound("no scripted run".to_string()))
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> agent_service::Result<Run> {
        self.record("submit_tool_outputs");
        self.submitted.lock().unwrap().push(outputs);
        Ok(run(RunStatus::Queued))
    }

    async fn cancel_run(&self, _thread_id: &str, _run_id: &str) -> agent_service::Result<Run> {
        self.record("cancel_run");
        Ok(run(RunStatus::Cancelling))
    }

    async fn upload_file(&self, upload: FileUpload) -> agent_service::Result<FileObject> {
        self.record("upload_file");
        let file = FileObject {
            id: "file_portfolio".to_string(),
            filename: upload.filename.clone(),
            purpose: Some(upload.purpose.as_str().to_string()),
            bytes: Some(upload.bytes.len() as u64),
        };
        self.uploads.lock().unwrap().push(upload);
        Ok(file)
    }

    async fn delete_file(&self, _file_id: &str) -> agent_service::Result<()> {
        self.record("delete_file");
        Ok(())
    }

    async fn file_content(&self, file_id: &str) -> agent_service::Result<Vec<u8>> {
        self.record("file_content");
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(file_id.to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
