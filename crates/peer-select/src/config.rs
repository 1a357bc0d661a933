//! Client configuration for talking to the local device API.

use std::time::Duration;

/// Configuration for HTTP collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the device whose registry and proxies we query
    pub device_url: String,
    /// Timeout for a whole request; bounds how long one slow peer can stall a resolution
    pub request_timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_url: "http://127.0.0.1:8080/".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

impl ClientConfig {
    pub fn with_device_url(mut self, device_url: impl Into<String>) -> Self {
        self.device_url = device_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        // Connect timeout never exceeds the request timeout
        self.connect_timeout = self.connect_timeout.min(timeout);
        self
    }
}
