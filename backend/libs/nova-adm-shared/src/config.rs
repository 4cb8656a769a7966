use std::time::Duration;

use crate::errors::ADMError;

/// Production token endpoint (Login with Amazon)
pub const ADM_TOKEN_URL: &str = "https://api.amazon.com/auth/O2/token";

/// Production registration endpoint, the registration id is appended to it
pub const ADM_REGISTRATION_URL: &str = "https://api.amazon.com/messaging/registrations/";

/// Default timeout applied to every HTTP round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ADM Configuration
#[derive(Clone)]
pub struct ADMConfig {
    pub client_id: String,
    pub client_secret: String,
    pub registration_url: String,
    pub token_url: String,
    pub request_timeout: Duration,
}

impl ADMConfig {
    /// Create new ADM configuration pointing at the production endpoints
    ///
    /// # Errors
    /// Returns `ADMError::Configuration` if either credential is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ADMError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(ADMError::Configuration("client_id is required".to_string()));
        }
        if client_secret.trim().is_empty() {
            return Err(ADMError::Configuration(
                "client_secret is required".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            registration_url: ADM_REGISTRATION_URL.to_string(),
            token_url: ADM_TOKEN_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the registration endpoint (must end with `/`)
    pub fn with_registration_url(mut self, registration_url: impl Into<String>) -> Self {
        self.registration_url = registration_url.into();
        self
    }

    /// Override the token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Load configuration from environment variables
    ///
    /// `ADM_CLIENT_ID` and `ADM_CLIENT_SECRET` are required.
    /// `ADM_REGISTRATION_URL`, `ADM_TOKEN_URL` and `ADM_REQUEST_TIMEOUT_SECS`
    /// fall back to the production defaults.
    pub fn from_env() -> Result<Self, ADMError> {
        let client_id = std::env::var("ADM_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("ADM_CLIENT_SECRET").unwrap_or_default();

        let mut config = Self::new(client_id, client_secret)?;

        if let Ok(url) = std::env::var("ADM_REGISTRATION_URL") {
            config = config.with_registration_url(url);
        }
        if let Ok(url) = std::env::var("ADM_TOKEN_URL") {
            config = config.with_token_url(url);
        }
        if let Ok(secs) = std::env::var("ADM_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                ADMError::Configuration(format!("invalid ADM_REQUEST_TIMEOUT_SECS: {}", e))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Delivery URL for a single registration id
    pub fn messages_url(&self, registration_id: &str) -> String {
        format!("{}{}/messages", self.registration_url, registration_id)
    }
}

impl std::fmt::Debug for ADMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ADMConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("registration_url", &self.registration_url)
            .field("token_url", &self.token_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
