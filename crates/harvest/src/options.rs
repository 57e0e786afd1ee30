// ABOUTME: Run options for the harvester and the fluent HarvesterBuilder that produces a Harvester.
// ABOUTME: Timeouts, user agent, extra headers, retry policies and the dry-run switch.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::HarvestError;
use crate::harvester::Harvester;
use crate::retry::RetryPolicy;

/// Configuration options shared by every site run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Timeout for listing and detail page requests.
    pub timeout: Duration,
    /// Timeout for a single image or video download.
    pub asset_timeout: Duration,
    pub user_agent: String,
    pub http_client: Option<reqwest::Client>,
    /// Headers sent with every request; site headers are added on top.
    pub headers: HashMap<String, String>,
    pub fetch_retry: RetryPolicy,
    pub persist_retry: RetryPolicy,
    /// Extract and classify without downloading assets or persisting records.
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            asset_timeout: Duration::from_secs(120),
            user_agent: format!("sitetrawl/{}", env!("CARGO_PKG_VERSION")),
            http_client: None,
            headers: HashMap::new(),
            fetch_retry: RetryPolicy::fetch_default(),
            persist_retry: RetryPolicy::persist_default(),
            dry_run: false,
        }
    }
}

/// Builder for constructing Harvester instances with custom configuration.
#[derive(Debug, Clone)]
pub struct HarvesterBuilder {
    opts: Options,
}

impl HarvesterBuilder {
    /// Create a new HarvesterBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the page request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the asset download timeout.
    pub fn asset_timeout(mut self, timeout: Duration) -> Self {
        self.opts.asset_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the retry policy for page loads.
    pub fn fetch_retry(mut self, policy: RetryPolicy) -> Self {
        self.opts.fetch_retry = policy;
        self
    }

    /// Set the retry policy for table writes.
    pub fn persist_retry(mut self, policy: RetryPolicy) -> Self {
        self.opts.persist_retry = policy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.opts.dry_run = dry_run;
        self
    }

    /// Build the Harvester with the configured options.
    pub fn build(self) -> Result<Harvester, HarvestError> {
        Harvester::new(self.opts)
    }
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
