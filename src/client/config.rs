use std::time::Duration;

use uuid::Uuid;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the API lives and who is calling it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_id: Uuid,
    /// Upper bound for one request, connect and body included.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
