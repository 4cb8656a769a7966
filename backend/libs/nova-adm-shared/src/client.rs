use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::ADMConfig;
use crate::errors::ADMError;
use crate::models::*;
use crate::suspension::SuspensionState;
use crate::token::TokenProvider;

pub const X_AMZN_TYPE_VERSION: &str = "com.amazon.device.messaging.ADMMessage@1.0";
pub const X_AMZN_ACCEPT_TYPE: &str = "com.amazon.device.messaging.ADMSendResult@1.0";

/// Amazon Device Messaging Client
///
/// Handles Amazon Device Messaging (ADM) for Kindle Fire and Fire OS devices.
/// Exchanges client credentials for access tokens, delivers messages and
/// honours the `Retry-After` backpressure ADM sends back.
#[derive(Debug, Clone)]
pub struct ADMClient {
    config: ADMConfig,
    tokens: TokenProvider,
    suspension: SuspensionState,
    http_client: reqwest::Client,
}

impl ADMClient {
    /// Create new ADM client with its own suspension state
    pub fn new(config: ADMConfig) -> Result<Self, ADMError> {
        Self::with_suspension_state(config, SuspensionState::new())
    }

    /// Create new ADM client gated by an existing suspension state
    ///
    /// Clients built from clones of the same `SuspensionState` stop sending
    /// together when any of them receives a `Retry-After`.
    pub fn with_suspension_state(
        config: ADMConfig,
        suspension: SuspensionState,
    ) -> Result<Self, ADMError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ADMError::HttpClient(e.to_string()))?;

        let tokens = TokenProvider::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            http_client.clone(),
        );

        info!(
            "Initialized ADM client for client_id={}, registration_url={}",
            config.client_id, config.registration_url
        );

        Ok(Self {
            config,
            tokens,
            suspension,
            http_client,
        })
    }

    pub fn config(&self) -> &ADMConfig {
        &self.config
    }

    pub fn suspension(&self) -> &SuspensionState {
        &self.suspension
    }

    /// Request a fresh access token
    pub async fn request_token(&self) -> Result<ADMToken, ADMError> {
        self.tokens.request_token().await
    }

    /// Request a fresh access token, discarding the failure reason
    pub async fn try_request_token(&self) -> Option<ADMToken> {
        match self.tokens.request_token().await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("ADM token request failed: {}", e);
                None
            }
        }
    }

    /// Send a message to a single registration id
    ///
    /// Never fails: suspension, transport and parsing problems are reported
    /// through `DeliveryResult::error` like any provider rejection.
    pub async fn send_message(
        &self,
        registration_id: &str,
        token: &ADMToken,
        message: &ADMMessage,
    ) -> DeliveryResult {
        let registration_prefix = registration_id.chars().take(8).collect::<String>();

        if let Err(e) = self.suspension.check(Utc::now()) {
            debug!("Skipping ADM send to {}: {}", registration_prefix, e);
            return DeliveryResult::failure(registration_id, e.to_string());
        }

        match self.deliver(registration_id, token, message).await {
            Ok(result) => {
                if let Some(reason) = &result.error {
                    warn!("ADM rejected message for {}: {}", registration_prefix, reason);
                } else if let Some(canonical_id) = &result.canonical_id {
                    info!(
                        "ADM issued canonical id for {} (canonical prefix: {})",
                        registration_prefix,
                        canonical_id.chars().take(8).collect::<String>()
                    );
                } else {
                    debug!("ADM delivery successful for {}", registration_prefix);
                }
                result
            }
            Err(e) => {
                warn!("ADM send failed for {}: {}", registration_prefix, e);
                DeliveryResult::failure(registration_id, e.to_string())
            }
        }
    }

    /// Send the same message to several registration ids, one after another
    pub async fn send_multicast(
        &self,
        registration_ids: &[String],
        token: &ADMToken,
        message: &ADMMessage,
    ) -> MulticastSendResult {
        let mut results = Vec::with_capacity(registration_ids.len());
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut canonical_count = 0;

        for registration_id in registration_ids {
            let result = self.send_message(registration_id, token, message).await;

            if result.is_success() {
                success_count += 1;
                if result.canonical_id.is_some() {
                    canonical_count += 1;
                }
            } else {
                failure_count += 1;
            }
            results.push(result);
        }

        info!(
            "ADM multicast complete: {} succeeded, {} failed, {} canonical",
            success_count, failure_count, canonical_count
        );

        MulticastSendResult {
            success_count,
            failure_count,
            canonical_count,
            results,
        }
    }

    async fn deliver(
        &self,
        registration_id: &str,
        token: &ADMToken,
        message: &ADMMessage,
    ) -> Result<DeliveryResult, ADMError> {
        let payload = message.to_payload();

        let response = self
            .http_client
            .post(self.config.messages_url(registration_id))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("x-amzn-type-version", X_AMZN_TYPE_VERSION)
            .header("x-amzn-accept-type", X_AMZN_ACCEPT_TYPE)
            .header(AUTHORIZATION, token.bearer())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ADMError::SendRequest(e.to_string()))?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        if let Err(e) = self
            .suspension
            .apply_retry_after(retry_after.as_deref(), Utc::now())
        {
            warn!("Ignoring ADM Retry-After header: {}", e);
        }

        match response.status() {
            StatusCode::FORBIDDEN => Ok(DeliveryResult::failure(
                registration_id,
                "HTTP request forbidden",
            )),
            StatusCode::REQUEST_TIMEOUT => Ok(DeliveryResult::failure(
                registration_id,
                "HTTP request timeout",
            )),
            _ => {
                let adm_response: ADMApiResponse = response
                    .json()
                    .await
                    .map_err(|e| ADMError::ResponseParse(e.to_string()))?;

                Ok(DeliveryResult::from_response(registration_id, &adm_response))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_client() -> ADMClient {
        let config = ADMConfig::new("client-id", "client-secret")
            .unwrap()
            // Nothing listens here; any request would fail fast
            .with_registration_url("http://127.0.0.1:9/registrations/")
            .with_token_url("http://127.0.0.1:9/token");
        ADMClient::new(config).unwrap()
    }

    #[test]
    fn test_adm_client_creation() {
        let client = test_client();

        assert_eq!(client.config().client_id, "client-id");
        assert!(client.suspension().suspended_until().is_none());
    }

    #[tokio::test]
    async fn test_suspended_client_does_not_send() {
        let client = test_client();
        let until = Utc::now() + Duration::seconds(300);
        client.suspension().suspend_until(until);

        let result = client
            .send_message("OLD123", &ADMToken::new("token"), &ADMMessage::new())
            .await;

        assert_eq!(
            result,
            DeliveryResult::failure("OLD123", format!("messages cannot be sent until {}", until))
        );
        assert_eq!(client.suspension().suspended_until(), Some(until));
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_result_error() {
        let client = test_client();

        let result = client
            .send_message("OLD123", &ADMToken::new("token"), &ADMMessage::new())
            .await;

        assert_eq!(result.registration_id, "OLD123");
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("ADM send request failed"));
        assert!(result.canonical_id.is_none());
    }

    #[tokio::test]
    async fn test_try_request_token_returns_none_on_failure() {
        let client = test_client();

        assert!(client.try_request_token().await.is_none());
        assert!(matches!(
            client.request_token().await,
            Err(ADMError::TokenRequest(_))
        ));
    }
}
