use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// Bearer token for the lookup service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Settings for reaching the account-name lookup service.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub base_url: String,
    pub token: Option<ApiToken>,
    /// Bound on a single lookup call.
    pub request_timeout: Duration,
    /// Bound on a whole resolution run, including a full directory scan.
    pub run_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}
