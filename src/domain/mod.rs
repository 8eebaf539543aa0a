//! Domain layer: strong types with validation and invariants (no I/O).

mod guidance;
mod request;
mod response;
mod validation;
mod value;

pub use guidance::{GUIDANCE_RULES, Guidance, GuidanceCategory};
pub use request::{
    BATCH_MAX_ITEMS, BatchRequest, BatchSendRequest, BillingNotice, SendRequest, ValidatedSend,
    validate,
};
pub use response::{BatchItemResult, BatchSummary, ProviderResult, SENT_MESSAGE};
pub use validation::{BatchSizeError, ValidationError};
pub use value::{ApiKey, MessageText, RequestId, ValidatedPhone};
