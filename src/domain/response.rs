use serde::Serialize;

use crate::domain::guidance::{Guidance, GuidanceCategory};
use crate::domain::value::RequestId;

pub const SENT_MESSAGE: &str = "SMS sent successfully";

/// Outcome of one provider call that produced a provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub success: bool,
    pub request_id: Option<RequestId>,
    /// Provider response body as received.
    pub raw_payload: serde_json::Value,
    /// Text meant for the end user: a fixed confirmation or remediation guidance.
    pub message: String,
    pub original_error: Option<String>,
    pub category: Option<GuidanceCategory>,
}

impl ProviderResult {
    pub fn accepted(request_id: Option<RequestId>, raw_payload: serde_json::Value) -> Self {
        Self {
            success: true,
            request_id,
            raw_payload,
            message: SENT_MESSAGE.to_owned(),
            original_error: None,
            category: None,
        }
    }

    pub fn rejected(provider_message: &str, raw_payload: serde_json::Value) -> Self {
        let Guidance {
            category,
            text,
            original,
        } = Guidance::for_provider_message(provider_message);
        Self {
            success: false,
            request_id: None,
            raw_payload,
            message: text,
            original_error: Some(original),
            category,
        }
    }
}

/// Per-item line of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemResult {
    pub phone: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_count: usize,
    pub success_count: usize,
    pub items: Vec<BatchItemResult>,
}

impl BatchSummary {
    pub fn from_items(items: Vec<BatchItemResult>) -> Self {
        let success_count = items.iter().filter(|item| item.success).count();
        Self {
            total_count: items.len(),
            success_count,
            items,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "Batch sent: {}/{} successful",
            self.success_count, self.total_count
        )
    }
}
