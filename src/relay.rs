//! Boundary facade for a request-handling layer: runs the send pipelines and
//! renders the JSON envelopes returned to the billing application.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::client::{GatewayClient, GatewayError};
use crate::config::{ConfigurationError, RelayConfig};
use crate::domain::{
    BatchRequest, BatchSizeError, BatchSummary, BillingNotice, GuidanceCategory, ProviderResult,
    SendRequest,
};

pub const TEST_MESSAGE_PREFIX: &str = "TEST SMS from Billing System";

/// Body of a connectivity test send, stamped with `at`.
pub fn test_message(at: DateTime<Utc>) -> String {
    format!("{TEST_MESSAGE_PREFIX} - {}", at.format("%Y-%m-%d %H:%M:%S"))
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("{0}")]
    Size(#[from] BatchSizeError),

    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl BatchError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Size(_) => 400,
            Self::Configuration(_) => 500,
        }
    }
}

/// Response to a single send.
///
/// Serialized as `{success: true, message, requestId, data, timestamp}` or
/// `{success: false, error, timestamp}` (plus `category`/`originalError` for
/// classified provider failures).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<GuidanceCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Suggested HTTP status for the handling layer.
    #[serde(skip)]
    pub status: u16,
}

impl SendEnvelope {
    pub fn from_outcome(
        outcome: Result<ProviderResult, GatewayError>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        match outcome {
            Ok(result) if result.success => Self {
                success: true,
                message: Some(result.message),
                request_id: result.request_id.map(|id| id.as_str().to_owned()),
                data: Some(result.raw_payload),
                error: None,
                category: None,
                original_error: None,
                timestamp,
                status: 200,
            },
            Ok(result) => Self::failure(result.message, timestamp, 400)
                .with_classification(result.category, result.original_error),
            Err(GatewayError::ProviderRejected { reason, category }) => {
                Self::failure(reason, timestamp, 400).with_classification(category, None)
            }
            Err(err) => {
                let status = err.http_status();
                Self::failure(err.to_string(), timestamp, status)
            }
        }
    }

    fn failure(error: String, timestamp: DateTime<Utc>, status: u16) -> Self {
        Self {
            success: false,
            message: None,
            request_id: None,
            data: None,
            error: Some(error),
            category: None,
            original_error: None,
            timestamp,
            status,
        }
    }

    fn with_classification(
        mut self,
        category: Option<GuidanceCategory>,
        original_error: Option<String>,
    ) -> Self {
        self.category = category;
        self.original_error = original_error;
        self
    }
}

/// Response to a batch send.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub summary: Option<BatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub status: u16,
}

impl BatchEnvelope {
    /// A batch that ran is a success even when every item failed; callers read
    /// `successCount` and the per-item results.
    pub fn from_outcome(outcome: Result<BatchSummary, BatchError>, timestamp: DateTime<Utc>) -> Self {
        match outcome {
            Ok(summary) => Self {
                success: true,
                message: Some(summary.describe()),
                summary: Some(summary),
                error: None,
                timestamp,
                status: 200,
            },
            Err(err) => Self {
                success: false,
                message: None,
                summary: None,
                error: Some(err.to_string()),
                timestamp,
                status: err.http_status(),
            },
        }
    }
}

/// Entry point for the request-handling layer.
///
/// The relay may be unconfigured (no API key). Sends then fail with
/// [`ConfigurationError::MissingApiKey`] after input validation and before any
/// provider call.
#[derive(Clone)]
pub struct SmsRelay {
    gateway: Option<GatewayClient>,
}

impl SmsRelay {
    pub fn new(config: &RelayConfig) -> Result<Self, GatewayError> {
        if !config.is_configured() {
            warn!("FAST2SMS_API_KEY is not set; SMS sends will be refused");
            return Ok(Self::unconfigured());
        }
        Ok(Self::with_gateway(GatewayClient::from_config(config)?))
    }

    pub fn with_gateway(gateway: GatewayClient) -> Self {
        Self {
            gateway: Some(gateway),
        }
    }

    pub fn unconfigured() -> Self {
        Self { gateway: None }
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_some()
    }

    fn gateway(&self) -> Result<&GatewayClient, ConfigurationError> {
        self.gateway.as_ref().ok_or_else(|| {
            error!("SMS send refused: FAST2SMS_API_KEY not configured");
            ConfigurationError::MissingApiKey
        })
    }

    /// Validate, then send one SMS.
    pub async fn try_send(&self, request: &SendRequest) -> Result<ProviderResult, GatewayError> {
        let send = request.validate()?;
        self.gateway()?.send(&send).await
    }

    pub async fn send_sms(&self, request: &SendRequest) -> SendEnvelope {
        SendEnvelope::from_outcome(self.try_send(request).await, Utc::now())
    }

    /// Send a timestamped test message to `phone`. Meant for development setups
    /// checking the credential and route; the handling layer decides where it is exposed.
    pub async fn send_test(&self, phone: &str) -> SendEnvelope {
        let now = Utc::now();
        let request = SendRequest::new(phone, test_message(now));
        SendEnvelope::from_outcome(self.try_send(&request).await, now)
    }

    /// Render the billing notice template and send it.
    pub async fn send_billing_notice(&self, notice: &BillingNotice) -> SendEnvelope {
        self.send_sms(&notice.to_send_request()).await
    }

    /// Size errors are reported before configuration errors.
    pub async fn try_send_batch(&self, items: Vec<SendRequest>) -> Result<BatchSummary, BatchError> {
        let batch = BatchRequest::new(items)?;
        let gateway = self.gateway()?;
        Ok(gateway.batch().run(&batch).await)
    }

    pub async fn send_batch(&self, items: Vec<SendRequest>) -> BatchEnvelope {
        BatchEnvelope::from_outcome(self.try_send_batch(items).await, Utc::now())
    }
}
