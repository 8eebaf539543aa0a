//! Relay from an internal billing application to the Fast2SMS bulk-send API.
//!
//! The crate is split the usual way: a domain layer of validated types and
//! guidance rules, a transport layer for the Fast2SMS wire format, and a small
//! client layer that performs the provider call. [`SmsRelay`] sits on top and
//! renders the JSON envelopes a request handler returns to its callers.
//!
//! ```rust,no_run
//! use fast2sms_relay::{GatewayClient, RelayConfig, SendRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fast2sms_relay::GatewayError> {
//!     let config = RelayConfig::from_env()?;
//!     let client = GatewayClient::from_config(&config)?;
//!     let result = client
//!         .send_request(&SendRequest::new("+91-9876543210", "Your invoice is ready"))
//!         .await?;
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod relay;
mod transport;

pub use client::{BatchCoordinator, GatewayClient, GatewayClientBuilder, GatewayError};
pub use config::{ConfigurationError, RelayConfig};
pub use domain::{
    ApiKey, BatchItemResult, BatchRequest, BatchSendRequest, BatchSizeError, BatchSummary,
    BillingNotice, GuidanceCategory, MessageText, ProviderResult, RequestId, SendRequest,
    ValidatedPhone, ValidatedSend, ValidationError, validate,
};
pub use relay::{
    BatchEnvelope, BatchError, SendEnvelope, SmsRelay, TEST_MESSAGE_PREFIX, test_message,
};
