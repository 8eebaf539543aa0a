use serde::Deserialize;

use crate::domain::{ProviderResult, RequestId, ValidatedSend};

/// Fast2SMS quick route: no registered sender id needed.
const QUICK_ROUTE: &str = "q";
const LANGUAGE: &str = "english";
const MISSING_PROVIDER_MESSAGE: &str = "API returned error";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct BulkSendJsonResponse {
    /// Only a literal `true` marks acceptance; `false`, `null`, a missing flag or
    /// any other value is a provider failure.
    #[serde(default, rename = "return")]
    ok: Option<serde_json::Value>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    message: Option<TransportMessage>,
}

/// Fast2SMS sends `message` as a string on errors and as a list of strings on success.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportMessage {
    Text(String),
    Lines(Vec<String>),
    Other(serde_json::Value),
}

impl TransportMessage {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => Some(text),
            Self::Lines(lines) => lines.into_iter().next(),
            Self::Other(_) => None,
        };
        text.filter(|text| !text.trim().is_empty())
    }
}

pub fn encode_bulk_send_body(send: &ValidatedSend) -> serde_json::Value {
    serde_json::json!({
        "route": QUICK_ROUTE,
        "message": send.message().as_str(),
        "language": LANGUAGE,
        "flash": 0,
        "numbers": send.phone().as_str(),
    })
}

pub fn decode_bulk_send_json_response(json: &str) -> Result<ProviderResult, TransportError> {
    let raw_payload: serde_json::Value = serde_json::from_str(json)?;
    let parsed = BulkSendJsonResponse::deserialize(&raw_payload)?;

    if parsed.ok == Some(serde_json::Value::Bool(true)) {
        let request_id = parsed.request_id.map(RequestId::new);
        return Ok(ProviderResult::accepted(request_id, raw_payload));
    }

    let provider_message = parsed
        .message
        .and_then(TransportMessage::into_text)
        .unwrap_or_else(|| MISSING_PROVIDER_MESSAGE.to_owned());
    Ok(ProviderResult::rejected(&provider_message, raw_payload))
}

/// Best-effort `message` of an error body, used for non-2xx responses.
pub fn provider_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<BulkSendJsonResponse>(body)
        .ok()?
        .message?
        .into_text()
}
