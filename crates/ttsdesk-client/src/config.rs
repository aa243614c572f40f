//! Public configuration for the TTS client.

use std::time::Duration;

/// Port the Coqui TTS server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5002;

/// Configuration for the TTS client.
///
/// # Example
///
/// ```
/// use ttsdesk_client::TtsClientConfig;
/// use std::time::Duration;
///
/// let config = TtsClientConfig::for_port(5002)
///     .with_request_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct TtsClientConfig {
    /// Server root, e.g. `http://localhost:5002`
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    /// Connection establishment limit per request
    pub(crate) request_timeout: Duration,
    /// Whole-transfer limit, including the synthesized audio body
    pub(crate) transfer_timeout: Duration,
    /// Limit for a single liveness probe
    pub(crate) health_timeout: Duration,
}

impl Default for TtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: base_url_for_port(DEFAULT_PORT),
            user_agent: concat!("ttsdesk-client/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(120),
            transfer_timeout: Duration::from_secs(300),
            health_timeout: Duration::from_secs(5),
        }
    }
}

/// `http://localhost:<port>`
pub fn base_url_for_port(port: u16) -> String {
    format!("http://localhost:{port}")
}

impl TtsClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration pointed at a local server on `port`.
    #[must_use]
    pub fn for_port(port: u16) -> Self {
        Self::default().with_base_url(base_url_for_port(port))
    }

    /// Set the server root URL.
    ///
    /// Defaults to `http://localhost:5002`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults to 120 seconds.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the overall transfer timeout.
    ///
    /// Synthesis on CPU can take minutes for long inputs. Defaults to 300
    /// seconds.
    #[must_use]
    pub const fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    /// Defaults to 5 seconds.
    #[must_use]
    pub const fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TtsClientConfig::new();
        assert_eq!(config.base_url, "http://localhost:5002");
        assert!(config.user_agent.contains("ttsdesk-client"));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.transfer_timeout, Duration::from_secs(300));
        assert_eq!(config.health_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_pattern() {
        let config = TtsClientConfig::for_port(6000)
            .with_user_agent("test-agent")
            .with_request_timeout(Duration::from_secs(1))
            .with_transfer_timeout(Duration::from_secs(2))
            .with_health_timeout(Duration::from_millis(300));

        assert_eq!(config.base_url(), "http://localhost:6000");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.transfer_timeout, Duration::from_secs(2));
        assert_eq!(config.health_timeout, Duration::from_millis(300));
    }
}
