//! Configuration for run polling and agent sessions

use crate::error::{Result, RunError};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the model deployment used by the agent
pub const MODEL_DEPLOYMENT_ENV: &str = "MODEL_DEPLOYMENT_NAME";

const DEFAULT_AGENT_NAME: &str = "portfolio-agent";
const DEFAULT_INSTRUCTIONS: &str = "You are a helpful agent that answers questions about the \
    user's stock portfolio. Use the fetch_stock_price function for current prices and the code \
    interpreter to analyse the attached portfolio file and draw charts.";

/// How a run is polled until it reaches a terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check
    pub interval: Duration,

    /// Give up after this much wall-clock time; `None` polls forever
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Some(Duration::from_secs(600)), // 10 minutes
        }
    }
}

impl PollPolicy {
    /// Create a new policy builder
    pub fn builder() -> PollPolicyBuilder {
        PollPolicyBuilder::default()
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(RunError::Config(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.max_wait.is_some_and(|max| max.is_zero()) {
            return Err(RunError::Config(
                "max_wait must be greater than 0 (use None to wait indefinitely)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for PollPolicy
#[derive(Debug, Default)]
pub struct PollPolicyBuilder {
    interval: Option<Duration>,
    max_wait: Option<Option<Duration>>,
}

impl PollPolicyBuilder {
    /// Set the delay between status checks
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the wall-clock limit for one run
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(Some(max_wait));
        self
    }

    /// Poll until the service reports a terminal status, however long it takes
    pub fn unbounded(mut self) -> Self {
        self.max_wait = Some(None);
        self
    }

    /// Build the policy
    pub fn build(self) -> Result<PollPolicy> {
        let defaults = PollPolicy::default();
        let policy = PollPolicy {
            interval: self.interval.unwrap_or(defaults.interval),
            max_wait: self.max_wait.unwrap_or(defaults.max_wait),
        };

        policy.validate()?;
        Ok(policy)
    }
}

/// Everything needed to start a [`crate::Session`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model deployment the agent runs on
    pub model: String,

    /// Display name of the created agent
    pub agent_name: String,

    /// System instructions for the agent
    pub instructions: String,

    /// Portfolio CSV uploaded for the code interpreter
    pub portfolio_path: PathBuf,

    /// Polling behaviour for every run of the session
    pub poll: PollPolicy,
}

impl SessionConfig {
    /// Create a new configuration builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(RunError::Config("model deployment name is empty".to_string()));
        }
        if self.agent_name.trim().is_empty() {
            return Err(RunError::Config("agent name is empty".to_string()));
        }
        if self.portfolio_path.as_os_str().is_empty() {
            return Err(RunError::Config("portfolio path is empty".to_string()));
        }
        self.poll.validate()
    }
}

/// Builder for SessionConfig
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    model: Option<String>,
    agent_name: Option<String>,
    instructions: Option<String>,
    portfolio_path: Option<PathBuf>,
    poll: Option<PollPolicy>,
    from_env: bool,
}

impl SessionConfigBuilder {
    /// Set the model deployment name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the agent name
    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    /// Set the agent instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the portfolio file
    pub fn portfolio_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.portfolio_path = Some(path.into());
        self
    }

    /// Set the poll policy
    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = Some(poll);
        self
    }

    /// Take the model from `MODEL_DEPLOYMENT_NAME` unless set explicitly
    pub fn with_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SessionConfig> {
        let model = match self.model {
            Some(model) => model,
            None if self.from_env => agent_utils::required_var(MODEL_DEPLOYMENT_ENV)?,
            None => {
                return Err(RunError::Config(
                    "model deployment name is required".to_string(),
                ));
            }
        };

        let config = SessionConfig {
            model,
            agent_name: self
                .agent_name
                .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            instructions: self
                .instructions
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            portfolio_path: self
                .portfolio_path
                .unwrap_or_else(|| PathBuf::from("portfolio.csv")),
            poll: self.poll.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
