//! Client configuration for bootstrap and system store access.

use crate::types::{BootstrapUrl, ZoneId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration consumed by the system store client factory.
///
/// Only the bootstrap URL list is required; everything else has defaults
/// sized for a small cluster on a healthy network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ordered seed endpoints tried during topology discovery
    pub bootstrap_urls: Vec<BootstrapUrl>,
    /// The client's home zone; `None` means zone-agnostic routing
    pub client_zone_id: Option<ZoneId>,
    /// Full passes over the seed list before bootstrap gives up
    pub max_bootstrap_retries: usize,
    /// Pause between failed bootstrap passes
    pub bootstrap_backoff: Duration,
    /// Ranked nodes tried per get/put before the store counts as unavailable
    pub max_store_attempts: usize,
    /// Per-attempt timeout for a single node interaction
    pub request_timeout: Duration,
    /// Overall deadline for one bootstrap or get/put call
    pub operation_deadline: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bootstrap_urls: Vec::new(),
            client_zone_id: None,
            max_bootstrap_retries: 2,
            bootstrap_backoff: Duration::from_millis(500),
            max_store_attempts: 3,
            request_timeout: Duration::from_secs(5),
            operation_deadline: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    /// Create a config from seed endpoints, leaving everything else default
    #[must_use]
    pub fn new(bootstrap_urls: Vec<BootstrapUrl>) -> Self {
        Self {
            bootstrap_urls,
            ..Self::default()
        }
    }

    /// Set the ordered bootstrap URL list
    #[must_use]
    pub fn with_bootstrap_urls(mut self, urls: Vec<BootstrapUrl>) -> Self {
        self.bootstrap_urls = urls;
        self
    }

    /// Set the client's home zone
    #[must_use]
    pub const fn with_client_zone_id(mut self, zone: ZoneId) -> Self {
        self.client_zone_id = Some(zone);
        self
    }

    /// Set the number of full bootstrap passes
    #[must_use]
    pub const fn with_max_bootstrap_retries(mut self, retries: usize) -> Self {
        self.max_bootstrap_retries = retries;
        self
    }

    /// Set the pause between failed bootstrap passes
    #[must_use]
    pub const fn with_bootstrap_backoff(mut self, backoff: Duration) -> Self {
        self.bootstrap_backoff = backoff;
        self
    }

    /// Set the per-call attempt cap for store operations
    #[must_use]
    pub const fn with_max_store_attempts(mut self, attempts: usize) -> Self {
        self.max_store_attempts = attempts;
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the overall per-operation deadline
    #[must_use]
    pub const fn with_operation_deadline(mut self, deadline: Duration) -> Self {
        self.operation_deadline = deadline;
        self
    }
}
