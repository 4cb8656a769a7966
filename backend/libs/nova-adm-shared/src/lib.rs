/// Nova ADM Shared Library
///
/// This library provides a unified Amazon Device Messaging (ADM) client
/// for sending push notifications to Kindle Fire and Fire OS devices across the Nova platform.
///
/// It handles:
/// - OAuth2 client-credentials token exchange
/// - Message payload construction with optional MD5 integrity checksum
/// - Retry-After backpressure through a shareable suspension state
/// - Normalizing ADM responses into a `DeliveryResult`
/// - Canonical registration id reporting

pub mod checksum;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod suspension;
pub mod token;

pub use checksum::calculate_md5_checksum;
pub use client::ADMClient;
pub use config::{ADMConfig, ADM_REGISTRATION_URL, ADM_TOKEN_URL};
pub use errors::ADMError;
pub use models::{ADMMessage, ADMToken, DeliveryResult, MulticastSendResult};
pub use suspension::{parse_retry_after, SuspensionState};
pub use token::TokenProvider;
