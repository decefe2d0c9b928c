//! Gateway configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest page the GitHub REST API returns.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Connection settings for [`crate::GithubGateway`].
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise
    /// `https://host/api/v3`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. Requests are sent unauthenticated when absent.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Items requested per page for every listing, 1 to [`MAX_PAGE_SIZE`].
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Timeout of a single HTTP request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            user_agent: default_user_agent(),
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Configuration for `base_url` with every other field defaulted.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_user_agent() -> String {
    format!("steward/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let config = GatewayConfig::default().with_token("ghp_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:8080"}"#).expect("config");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.token, None);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
