//! Run driver for hosted agent runs
//!
//! The RunDriver implements the polling loop around a remote run:
//! 1. Post the user message and start a run
//! 2. Sleep, then fetch the run status
//! 3. If tool outputs are required, resolve every call locally and submit
//!    them as one batch
//! 4. Loop until the service reports a terminal status (or the poll policy
//!    gives up)
//!
//! The service owns the run state machine. The driver only observes it and
//! never runs two operations on the same run concurrently.

use agent_service::{
    AgentService, Attachment, CreateMessageRequest, ListMessagesQuery, Message,
    RequiredToolCall, Run, RunLastError, RunStatus, ToolOutput,
};
use agent_tools::{DispatchError, FunctionRegistry};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::PollPolicy;
use crate::error::{Result, RunError};

/// Observer for run progress
///
/// Implement this trait to follow a run as it is driven, e.g. to print
/// status changes in a CLI.
#[async_trait]
pub trait RunObserver: Send + Sync {
    /// Called after every status check
    async fn on_status(&self, _run: &Run) {}

    /// Called after a tool call has been resolved locally
    async fn on_tool_output(&self, _call: &RequiredToolCall, _output: &str) {}
}

/// No-op observer for when progress is not needed
pub struct NoOpObserver;

#[async_trait]
impl RunObserver for NoOpObserver {}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run completed; all thread messages in creation order
    Completed { run_id: String, messages: Vec<Message> },

    /// The service ended the run without completing it
    Failed {
        run_id: String,
        /// `failed`, `cancelled` or `expired`
        status: RunStatus,
        last_error: Option<RunLastError>,
        /// Text of the most recent thread message, usually the agent's explanation
        message: Option<String>,
    },

    /// The poll policy's `max_wait` elapsed before a terminal status; the
    /// run was cancelled (best effort)
    TimedOut {
        run_id: String,
        /// Last status observed
        status: RunStatus,
        waited: Duration,
    },
}

impl RunOutcome {
    pub fn run_id(&self) -> &str {
        match self {
            RunOutcome::Completed { run_id, .. }
            | RunOutcome::Failed { run_id, .. }
            | RunOutcome::TimedOut { run_id, .. } => run_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Messages of a completed run (empty otherwise)
    pub fn messages(&self) -> &[Message] {
        match self {
            RunOutcome::Completed { messages, .. } => messages,
            _ => &[],
        }
    }
}

/// Drives runs of a remote agent to a terminal outcome
pub struct RunDriver {
    service: Arc<dyn AgentService>,
    registry: Arc<FunctionRegistry>,
    policy: PollPolicy,
    observer: Arc<dyn RunObserver>,
}

impl RunDriver {
    /// Create a new run driver
    pub fn new(
        service: Arc<dyn AgentService>,
        registry: Arc<FunctionRegistry>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            service,
            registry,
            policy,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Set the observer receiving progress callbacks
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the observer (mutable reference version)
    pub fn set_observer(&mut self, observer: Arc<dyn RunObserver>) {
        self.observer = observer;
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Post a user message to the thread and start a run of the agent
    ///
    /// Returns the run as first reported by the service (normally `queued`).
    pub async fn submit(
        &self,
        thread_id: &str,
        agent_id: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Result<Run> {
        let preview: String = content.chars().take(200).collect();
        debug!(
            thread_id = %thread_id,
            attachments = attachments.len(),
            message_preview = %preview,
            "Posting user message"
        );

        let message = self
            .service
            .create_message(
                thread_id,
                CreateMessageRequest::user(content).with_attachments(attachments),
            )
            .await?;
        debug!(message_id = %message.id, "Message created");

        let run = self.service.create_run(thread_id, agent_id).await?;
        info!(
            run_id = %run.id,
            thread_id = %thread_id,
            status = %run.status,
            service = %self.service.name(),
            "Run created"
        );
        Ok(run)
    }

    /// Submit a message and wait for the resulting run to finish
    pub async fn run(
        &self,
        thread_id: &str,
        agent_id: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Result<RunOutcome> {
        let run = self.submit(thread_id, agent_id, content, attachments).await?;
        self.await_completion(&run).await
    }

    /// Poll `run` until it reaches a terminal status
    ///
    /// Tool calls requested along the way are answered from the registry.
    /// An unregistered function is fatal: the run is cancelled (best effort)
    /// and [`RunError::UnknownFunction`] is returned.
    pub async fn await_completion(&self, run: &Run) -> Result<RunOutcome> {
        let thread_id = run.thread_id.as_str();
        let run_id = run.id.as_str();
        let started = Instant::now();
        let mut status = run.status;
        let mut answered: HashSet<String> = HashSet::new();
        let mut cancel_requested = false;
        let mut polls = 0usize;

        loop {
            let mut delay = self.policy.interval;
            if let Some(max_wait) = self.policy.max_wait {
                let waited = started.elapsed();
                if waited >= max_wait {
                    warn!(
                        run_id = %run_id,
                        status = %status,
                        waited_secs = waited.as_secs(),
                        polls = polls,
                        "Run did not finish within max_wait, cancelling"
                    );
                    if let Err(e) = self.service.cancel_run(thread_id, run_id).await {
                        warn!(run_id = %run_id, error = %e, "Failed to cancel run");
                    }
                    return Ok(RunOutcome::TimedOut {
                        run_id: run_id.to_string(),
                        status,
                        waited,
                    });
                }
                delay = delay.min(max_wait - waited);
            }

            tokio::time::sleep(delay).await;

            let current = self.service.get_run(thread_id, run_id).await?;
            polls += 1;
            debug!(run_id = %run_id, status = %current.status, poll = polls, "Polled run");

            if current.status != status {
                info!(
                    run_id = %run_id,
                    from = %status,
                    to = %current.status,
                    "Run status changed"
                );
                status = current.status;
            }
            self.observer.on_status(&current).await;

            match current.status {
                RunStatus::RequiresAction => {
                    let Some(calls) = current.pending_tool_calls() else {
                        warn!(run_id = %run_id, "Run requires an action this client cannot perform");
                        continue;
                    };

                    if calls.is_empty() {
                        if !cancel_requested {
                            warn!(run_id = %run_id, "No tool calls provided, cancelling run");
                            self.service.cancel_run(thread_id, run_id).await?;
                            cancel_requested = true;
                        }
                        continue;
                    }

                    if calls.iter().all(|c| answered.contains(&c.id)) {
                        debug!(run_id = %run_id, "Tool outputs already submitted, waiting");
                        continue;
                    }

                    let outputs = self.resolve_tool_calls(&current, calls).await?;
                    info!(
                        run_id = %run_id,
                        output_count = outputs.len(),
                        "Submitting tool outputs"
                    );
                    answered.extend(outputs.iter().map(|o| o.tool_call_id.clone()));
                    self.service
                        .submit_tool_outputs(thread_id, run_id, outputs)
                        .await?;
                }

                RunStatus::Completed => {
                    let messages = self
                        .service
                        .list_messages(thread_id, ListMessagesQuery::ascending())
                        .await?;
                    info!(
                        run_id = %run_id,
                        message_count = messages.len(),
                        polls = polls,
                        "Run completed"
                    );
                    return Ok(RunOutcome::Completed {
                        run_id: run_id.to_string(),
                        messages,
                    });
                }

                RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => {
                    let latest = self
                        .service
                        .list_messages(thread_id, ListMessagesQuery::latest())
                        .await?;
                    let message = latest.first().and_then(Message::text);
                    warn!(
                        run_id = %run_id,
                        status = %current.status,
                        last_error = ?current.last_error,
                        "Run ended without completing"
                    );
                    return Ok(RunOutcome::Failed {
                        run_id: run_id.to_string(),
                        status: current.status,
                        last_error: current.last_error,
                        message,
                    });
                }

                RunStatus::Queued
                | RunStatus::InProgress
                | RunStatus::Cancelling
                | RunStatus::Unknown => {}
            }
        }
    }

    /// Resolve every pending call, producing exactly one output per call
    async fn resolve_tool_calls(
        &self,
        run: &Run,
        calls: &[RequiredToolCall],
    ) -> Result<Vec<ToolOutput>> {
        info!(run_id = %run.id, tool_count = calls.len(), "Agent requested tool use");
        let mut outputs = Vec::with_capacity(calls.len());

        for call in calls {
            let name = call.function.name.as_str();
            let arguments_preview: String = call.function.arguments.chars().take(500).collect();
            info!(
                function = %name,
                call_id = %call.id,
                arguments_preview = %arguments_preview,
                "Executing function"
            );

            let start_time = std::time::Instant::now();
            match self.registry.dispatch(name, &call.function.arguments).await {
                Ok(output) => {
                    let output_preview: String = output.chars().take(500).collect();
                    info!(
                        function = %name,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        output_preview = %output_preview,
                        "Function returned"
                    );
                    self.observer.on_tool_output(call, &output).await;
                    outputs.push(ToolOutput::new(&call.id, output));
                }
                Err(DispatchError::UnknownFunction(function)) => {
                    error!(run_id = %run.id, function = %function, "Unknown function requested");
                    if let Err(e) = self.service.cancel_run(&run.thread_id, &run.id).await {
                        warn!(run_id = %run.id, error = %e, "Failed to cancel run");
                    }
                    return Err(RunError::UnknownFunction {
                        run_id: run.id.clone(),
                        function,
                    });
                }
            }
        }

        Ok(outputs)
    }
}
