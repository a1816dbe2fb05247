use std::time::Duration;

/// Request timeout applied to every upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = concat!("llama-core/", env!("CARGO_PKG_VERSION"));

/// Environment variable that overrides the outgoing user agent.
pub const USER_AGENT_ENV: &str = "LLAMA_CORE_USER_AGENT";

/// Client-wide settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the user agent taken from `LLAMA_CORE_USER_AGENT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(user_agent) = std::env::var(USER_AGENT_ENV) {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent;
            }
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
