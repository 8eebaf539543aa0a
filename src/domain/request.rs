use serde::{Deserialize, Deserializer};

use crate::domain::validation::{BatchSizeError, ValidationError};
use crate::domain::value::{MessageText, ValidatedPhone};

pub const BATCH_MAX_ITEMS: usize = 100;

/// One send as received from the billing application.
///
/// Fields are kept raw; missing or `null` JSON fields deserialize as empty
/// strings and are rejected by [`SendRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl SendRequest {
    pub fn new(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            message: message.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedSend, ValidationError> {
        validate(&self.phone, &self.message)
    }
}

/// A send that passed validation and may be handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSend {
    phone: ValidatedPhone,
    message: MessageText,
}

impl ValidatedSend {
    pub fn phone(&self) -> &ValidatedPhone {
        &self.phone
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }
}

/// Check required fields first, then the phone format.
pub fn validate(phone: &str, message: &str) -> Result<ValidatedSend, ValidationError> {
    if phone.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: ValidatedPhone::FIELD,
        });
    }
    let message = MessageText::new(message)?;
    let phone = ValidatedPhone::parse(phone)?;
    Ok(ValidatedSend { phone, message })
}

/// Ordered list of sends, 1 to [`BATCH_MAX_ITEMS`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    items: Vec<SendRequest>,
}

impl BatchRequest {
    pub fn new(items: Vec<SendRequest>) -> Result<Self, BatchSizeError> {
        if items.is_empty() {
            return Err(BatchSizeError::Empty);
        }
        if items.len() > BATCH_MAX_ITEMS {
            return Err(BatchSizeError::TooLarge {
                max: BATCH_MAX_ITEMS,
                actual: items.len(),
            });
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[SendRequest] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Batch body as received from the billing application: `{"items": [...]}`.
///
/// A missing or `null` list deserializes as empty and fails the size check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchSendRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<SendRequest>,
}

impl BatchSendRequest {
    pub fn into_batch(self) -> Result<BatchRequest, BatchSizeError> {
        BatchRequest::new(self.items)
    }
}

/// Invoice reminder rendered into a fixed message template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BillingNotice {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
}

impl BillingNotice {
    pub fn message(&self) -> String {
        let customer_name = non_blank(self.customer_name.as_deref()).unwrap_or("Customer");
        let amount = non_blank(self.amount.as_deref()).unwrap_or("0");
        let invoice_id = non_blank(self.invoice_id.as_deref()).unwrap_or("N/A");
        format!(
            "Hi {customer_name}, Your billing amount is Rs. {amount}. Invoice ID: {invoice_id}. Thank you!"
        )
    }

    pub fn to_send_request(&self) -> SendRequest {
        SendRequest::new(self.phone.clone(), self.message())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|it| !it.is_empty())
}
