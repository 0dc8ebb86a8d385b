//! Lifecycle of the remote resources behind one conversation
//!
//! A [`Session`] uploads the portfolio, creates the agent and a thread, and
//! owns their IDs until [`Session::close`] deletes them again.

use agent_service::{
    Agent, AgentService, Attachment, CreateAgentRequest, FileObject, FilePurpose, FileUpload,
    Thread, ToolDefinition, ToolResources,
};
use agent_tools::FunctionRegistry;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::driver::{RunDriver, RunObserver, RunOutcome};
use crate::error::{Result, RunError};

/// Agent, thread and uploaded portfolio of one conversation
pub struct Session {
    service: Arc<dyn AgentService>,
    driver: RunDriver,
    agent: Agent,
    thread: Thread,
    portfolio: FileObject,
    /// Set by `close`; a session dropped without it logs a warning
    closed: bool,
}

impl Session {
    /// Create the remote resources for a conversation
    ///
    /// The portfolio file is read before any remote call. If a later step
    /// fails, the resources created so far are deleted again.
    pub async fn start(
        service: Arc<dyn AgentService>,
        registry: Arc<FunctionRegistry>,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;

        let path = &config.portfolio_path;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RunError::io(path, e))?;
        let filename = path
            .file_name()
            .map_or_else(|| "portfolio.csv".to_string(), |n| n.to_string_lossy().into_owned());

        let portfolio = service
            .upload_file(FileUpload {
                filename,
                bytes,
                purpose: FilePurpose::Assistants,
            })
            .await?;
        info!(file_id = %portfolio.id, filename = %portfolio.filename, "Uploaded portfolio");

        let request = CreateAgentRequest {
            model: config.model.clone(),
            name: config.agent_name.clone(),
            instructions: config.instructions.clone(),
            tools: tool_definitions(&registry),
            tool_resources: Some(ToolResources::code_interpreter(vec![portfolio.id.clone()])),
        };
        let agent = match service.create_agent(request).await {
            Ok(agent) => agent,
            Err(e) => {
                cleanup(service.as_ref(), None, Some(&portfolio.id)).await;
                return Err(e.into());
            }
        };
        info!(agent_id = %agent.id, model = %agent.model, "Created agent");

        let thread = match service.create_thread().await {
            Ok(thread) => thread,
            Err(e) => {
                cleanup(service.as_ref(), Some(&agent.id), Some(&portfolio.id)).await;
                return Err(e.into());
            }
        };
        info!(thread_id = %thread.id, "Created thread");

        let driver = RunDriver::new(service.clone(), registry, config.poll);
        Ok(Self {
            service,
            driver,
            agent,
            thread,
            portfolio,
            closed: false,
        })
    }

    /// Set the observer receiving run progress
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.driver.set_observer(observer);
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn portfolio(&self) -> &FileObject {
        &self.portfolio
    }

    /// Ask the agent a question about the portfolio and wait for the run
    pub async fn ask(&self, prompt: &str) -> Result<RunOutcome> {
        self.driver
            .run(
                &self.thread.id,
                &self.agent.id,
                prompt,
                vec![Attachment::code_interpreter(&self.portfolio.id)],
            )
            .await
    }

    /// Delete the agent and the uploaded portfolio
    ///
    /// Both deletions are attempted; the first failure is returned.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;

        let agent = self.service.delete_agent(&self.agent.id).await;
        match &agent {
            Ok(()) => info!(agent_id = %self.agent.id, "Deleted agent"),
            Err(e) => warn!(agent_id = %self.agent.id, error = %e, "Failed to delete agent"),
        }

        let file = self.service.delete_file(&self.portfolio.id).await;
        match &file {
            Ok(()) => info!(file_id = %self.portfolio.id, "Deleted portfolio file"),
            Err(e) => warn!(file_id = %self.portfolio.id, error = %e, "Failed to delete portfolio file"),
        }

        agent.and(file).map_err(RunError::from)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                agent_id = %self.agent.id,
                file_id = %self.portfolio.id,
                "Session dropped without close; remote resources were not deleted"
            );
        }
    }
}

/// Function tools from the registry plus the code interpreter
fn tool_definitions(registry: &FunctionRegistry) -> Vec<ToolDefinition> {
    registry
        .tools()
        .map(|tool| ToolDefinition::function(tool.name(), tool.description(), tool.parameters()))
        .chain(std::iter::once(ToolDefinition::CodeInterpreter))
        .collect()
}

async fn cleanup(service: &dyn AgentService, agent_id: Option<&str>, file_id: Option<&str>) {
    if let Some(id) = agent_id {
        if let Err(e) = service.delete_agent(id).await {
            warn!(agent_id = %id, error = %e, "Failed to delete agent during cleanup");
        }
    }
    if let Some(id) = file_id {
        if let Err(e) = service.delete_file(id).await {
            warn!(file_id = %id, error = %e, "Failed to delete file during cleanup");
        }
    }
}
