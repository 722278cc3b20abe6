//! Configuration for API endpoints and credentials

use std::time::Duration;

/// Default base URL for the messaging API
pub const API_URL: &str = "https://api.groupme.com/v3";

/// Default base URL for the image service
pub const IMAGE_API_URL: &str = "https://image.groupme.com";

/// Configuration for a [`Client`](crate::Client)
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for all API requests
    pub api_url: String,
    /// Base URL for image uploads
    pub image_api_url: String,
    /// Access token sent with every request
    pub token: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Create a config with default endpoints for the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: API_URL.to_string(),
            image_api_url: IMAGE_API_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("parlor/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a new config builder
    pub fn builder(token: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::new(token),
        }
    }
}

/// Builder for [`Config`]
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the API base URL
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the image service base URL
    #[must_use]
    pub fn image_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_api_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> Config {
        self.config
    }
}
