//! Endpoint configuration for the agent service

use crate::{Result, ServiceError};
use std::fmt;
use std::str::FromStr;

/// Environment variable holding the project connection string
pub const CONNECTION_STRING_ENV: &str = "PROJECT_CONNECTION_STRING";
/// Environment variable holding an optional bearer token
pub const ACCESS_TOKEN_ENV: &str = "PROJECT_ACCESS_TOKEN";
/// Environment variable overriding the API version
pub const API_VERSION_ENV: &str = "AGENTS_API_VERSION";

const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Parsed project connection string
///
/// Format: `<HostName>;<SubscriptionId>;<ResourceGroup>;<ProjectName>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConnection {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ProjectConnection {
    /// Base URL of the agents API for this project
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.host, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

impl FromStr for ProjectConnection {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(';').map(str::trim).collect();

        let [host, subscription_id, resource_group, project_name] = parts.as_slice() else {
            return Err(ServiceError::ConfigurationError(format!(
                "Connection string must have 4 ';'-separated parts, got {}",
                parts.len()
            )));
        };

        if [host, subscription_id, resource_group, project_name]
            .iter()
            .any(|p| p.is_empty())
        {
            return Err(ServiceError::ConfigurationError(
                "Connection string contains an empty part".to_string(),
            ));
        }

        let host = host
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            subscription_id: (*subscription_id).to_string(),
            resource_group: (*resource_group).to_string(),
            project_name: (*project_name).to_string(),
        })
    }
}

impl fmt::Display for ProjectConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.host, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

/// Configuration for [`crate::HttpAgentService`]
#[derive(Clone)]
pub struct AgentServiceConfig {
    /// Base URL every request path is appended to
    pub endpoint: String,

    /// Value of the `api-version` query parameter
    pub api_version: String,

    /// Bearer token; requests are sent unauthenticated when `None`
    pub access_token: Option<String>,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl fmt::Debug for AgentServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AgentServiceConfig {
    /// Create a config for an explicit endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create a config from a project connection string
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let connection: ProjectConnection = connection_string.parse()?;
        Ok(Self::new(connection.endpoint()))
    }

    /// Create config from environment variables
    ///
    /// Requires `PROJECT_CONNECTION_STRING`. Reads `PROJECT_ACCESS_TOKEN` and
    /// `AGENTS_API_VERSION` when set.
    pub fn from_env() -> Result<Self> {
        let connection_string = agent_utils::required_var(CONNECTION_STRING_ENV)?;
        let mut config = Self::from_connection_string(&connection_string)?;

        config.access_token = agent_utils::optional_var(ACCESS_TOKEN_ENV);
        if let Some(version) = agent_utils::optional_var(API_VERSION_ENV) {
            config.api_version = version;
        }

        Ok(config)
    }

    /// Set the bearer token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
