//! Client layer for the hosted agent service
//!
//! The remote service owns agents, conversation threads, messages, runs and
//! uploaded files. This crate provides:
//!
//! - Wire types for those resources
//! - The [`AgentService`] trait describing the operations the driver consumes
//! - [`HttpAgentService`], a `reqwest` implementation of the REST API
//! - Endpoint configuration derived from a project connection string

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

// Re-export main types
pub use client::HttpAgentService;
pub use config::{AgentServiceConfig, ProjectConnection};
pub use error::{Result, ServiceError};
pub use models::{
    Agent, Attachment, CodeInterpreterResource, CreateAgentRequest, CreateMessageRequest,
    FileObject, FilePurpose, FileUpload, FunctionCall, FunctionDefinition, ImageFileContent,
    ListMessagesQuery, ListOrder, Message, MessageContent, RequiredAction, RequiredToolCall,
    Role, Run, RunLastError, RunStatus, SubmitToolOutputs, TextContent, Thread, ToolDefinition,
    ToolOutput, ToolResources,
};
pub use service::AgentService;
