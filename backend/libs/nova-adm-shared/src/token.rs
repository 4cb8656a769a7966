use tracing::{debug, info, warn};

use crate::errors::ADMError;
use crate::models::ADMToken;

/// OAuth2 scope granting ADM send access
pub const ADM_MESSAGING_SCOPE: &str = "messaging:push";

/// Client-credentials token exchange against the ADM token endpoint
///
/// Every call performs exactly one request. Tokens are handed back to the
/// caller and are neither cached nor refreshed here.
#[derive(Clone)]
pub struct TokenProvider {
    token_url: String,
    client_id: String,
    client_secret: String,
    http_client: reqwest::Client,
}

impl TokenProvider {
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            token_url,
            client_id,
            client_secret,
            http_client,
        }
    }

    /// Exchange the client credentials for an access token
    pub async fn request_token(&self) -> Result<ADMToken, ADMError> {
        debug!("Requesting ADM access token from {}", self.token_url);

        let params = [
            ("grant_type", "client_credentials"),
            ("scope", ADM_MESSAGING_SCOPE),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ADMError::TokenRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("ADM token request rejected with status {}", status);
            return Err(ADMError::TokenRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token: ADMToken = response
            .json()
            .await
            .map_err(|e| ADMError::TokenParse(e.to_string()))?;

        info!(
            "Obtained ADM access token (expires_in: {:?})",
            token.expires_in
        );

        Ok(token)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
