use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::checksum::calculate_md5_checksum;

/// OAuth2 access token returned by the token endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct ADMToken {
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ADMToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scope: None,
            token_type: None,
            expires_in: None,
            extra: HashMap::new(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for ADMToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ADMToken")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Message to deliver to one or more registration ids
#[derive(Debug, Clone, Default)]
pub struct ADMMessage {
    pub data: HashMap<String, String>,
    /// Folded into `data` under the `message` key
    pub message: Option<String>,
    pub consolidation_key: Option<String>,
    /// Seconds ADM keeps the message for an offline device
    pub expires_after: Option<u64>,
    /// Attach the `md5` checksum of the data map
    pub send_md5: bool,
}

impl ADMMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_consolidation_key(mut self, consolidation_key: impl Into<String>) -> Self {
        self.consolidation_key = Some(consolidation_key.into());
        self
    }

    pub fn with_expires_after(mut self, seconds: u64) -> Self {
        self.expires_after = Some(seconds);
        self
    }

    pub fn with_md5(mut self) -> Self {
        self.send_md5 = true;
        self
    }

    /// Build the wire payload without touching `self.data`
    ///
    /// Empty strings and a zero `expires_after` count as unset.
    pub fn to_payload(&self) -> ADMPayload {
        let mut data = self.data.clone();
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            data.insert("message".to_string(), message.clone());
        }

        let md5 = self.send_md5.then(|| calculate_md5_checksum(&data));

        ADMPayload {
            data,
            consolidation_key: self
                .consolidation_key
                .clone()
                .filter(|key| !key.is_empty()),
            expires_after: self.expires_after.filter(|seconds| *seconds > 0),
            md5,
        }
    }
}

/// ADM Message Request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ADMPayload {
    pub data: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidation_key: Option<String>,
    #[serde(rename = "expiresAfter", skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

/// ADM API Response
#[derive(Debug, Default, Deserialize)]
pub struct ADMApiResponse {
    #[serde(rename = "registrationID")]
    pub registration_id: Option<String>,
    pub reason: Option<String>,
}

/// Normalized outcome of a single send
///
/// At most one of `error` and `canonical_id` is set. A `canonical_id` means
/// ADM replaced the registration id and the stored id must be updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub registration_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
}

impl DeliveryResult {
    pub fn success(registration_id: impl Into<String>) -> Self {
        Self {
            registration_id: registration_id.into(),
            error: None,
            canonical_id: None,
        }
    }

    pub fn failure(registration_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            registration_id: registration_id.into(),
            error: Some(error.into()),
            canonical_id: None,
        }
    }

    pub fn canonical(registration_id: impl Into<String>, canonical_id: impl Into<String>) -> Self {
        Self {
            registration_id: registration_id.into(),
            error: None,
            canonical_id: Some(canonical_id.into()),
        }
    }

    /// Classify a parsed response body for `registration_id`
    pub fn from_response(registration_id: &str, response: &ADMApiResponse) -> Self {
        if let Some(reason) = &response.reason {
            return Self::failure(registration_id, reason.clone());
        }

        match &response.registration_id {
            Some(returned) if returned != registration_id => {
                Self::canonical(registration_id, returned.clone())
            }
            _ => Self::success(registration_id),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Multicast send result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticastSendResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub canonical_count: usize,
    pub results: Vec<DeliveryResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_folds_message_without_mutating_data() {
        let msg = ADMMessage::new()
            .with_entry("title", "Hi")
            .with_message("hello");

        let payload = msg.to_payload();

        assert_eq!(payload.data.get("message").map(String::as_str), Some("hello"));
        assert_eq!(payload.data.get("title").map(String::as_str), Some("Hi"));
        assert!(!msg.data.contains_key("message"));
    }

    #[test]
    fn test_payload_serialization_omits_unset_fields() {
        let payload = ADMMessage::new().with_entry("k", "v").to_payload();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json, serde_json::json!({ "data": { "k": "v" } }));
    }

    #[test]
    fn test_payload_serialization_with_all_fields() {
        let payload = ADMMessage::new()
            .with_message("Hi")
            .with_consolidation_key("sync")
            .with_expires_after(3600)
            .with_md5()
            .to_payload();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "data": { "message": "Hi" },
                "consolidation_key": "sync",
                "expiresAfter": 3600,
                "md5": "0Yg4fqC9YeOxlfhaSdFNQA=="
            })
        );
    }

    #[test]
    fn test_payload_skips_empty_optional_fields() {
        let payload = ADMMessage::new()
            .with_entry("k", "v")
            .with_message("")
            .with_consolidation_key("")
            .with_expires_after(0)
            .to_payload();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json, serde_json::json!({ "data": { "k": "v" } }));
    }

    #[test]
    fn test_token_parsing_keeps_extra_fields() {
        let token: ADMToken = serde_json::from_value(serde_json::json!({
            "access_token": "Atc|abc",
            "scope": "messaging:push",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "ignored-but-kept"
        }))
        .unwrap();

        assert_eq!(token.bearer(), "Bearer Atc|abc");
        assert_eq!(token.expires_in, Some(3600));
        assert!(token.extra.contains_key("refresh_token"));
        assert!(!format!("{:?}", token).contains("Atc|abc"));
    }

    #[test]
    fn test_result_from_response_reason() {
        let response = ADMApiResponse {
            registration_id: None,
            reason: Some("InvalidRegistrationId".to_string()),
        };

        assert_eq!(
            DeliveryResult::from_response("OLD123", &response),
            DeliveryResult::failure("OLD123", "InvalidRegistrationId")
        );
    }

    #[test]
    fn test_result_from_response_canonical() {
        let response = ADMApiResponse {
            registration_id: Some("NEW123".to_string()),
            reason: None,
        };

        let result = DeliveryResult::from_response("OLD123", &response);
        assert_eq!(result.canonical_id.as_deref(), Some("NEW123"));
        assert!(result.error.is_none());
        assert!(result.is_success());
    }

    #[test]
    fn test_result_from_response_same_id() {
        let response = ADMApiResponse {
            registration_id: Some("OLD123".to_string()),
            reason: None,
        };

        assert_eq!(
            DeliveryResult::from_response("OLD123", &response),
            DeliveryResult::success("OLD123")
        );
        assert_eq!(
            DeliveryResult::from_response("OLD123", &ADMApiResponse::default()),
            DeliveryResult::success("OLD123")
        );
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_string(&DeliveryResult::success("abc")).unwrap();
        assert_eq!(json, r#"{"registration_id":"abc"}"#);
    }
}
