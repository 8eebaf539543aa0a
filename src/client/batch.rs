use tracing::{info, warn};

use crate::client::GatewayClient;
use crate::domain::{BatchItemResult, BatchRequest, BatchSizeError, BatchSummary, SendRequest};

/// Sends a batch strictly in order, one provider call at a time.
///
/// Every item ends up in the summary; a failed item never stops the ones after it.
/// Calls never overlap.
#[derive(Clone, Copy)]
pub struct BatchCoordinator<'a> {
    gateway: &'a GatewayClient,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(gateway: &'a GatewayClient) -> Self {
        Self { gateway }
    }

    /// Check the batch size, then send every item.
    ///
    /// Returns [`BatchSizeError`] without contacting the provider when `items` is
    /// empty or longer than [`crate::domain::BATCH_MAX_ITEMS`].
    pub async fn send_batch(&self, items: Vec<SendRequest>) -> Result<BatchSummary, BatchSizeError> {
        let batch = BatchRequest::new(items)?;
        Ok(self.run(&batch).await)
    }

    pub async fn run(&self, batch: &BatchRequest) -> BatchSummary {
        info!(count = batch.len(), "sending SMS batch");

        let mut items = Vec::with_capacity(batch.len());
        for (index, request) in batch.items().iter().enumerate() {
            items.push(self.send_item(index, request).await);
        }

        let summary = BatchSummary::from_items(items);
        info!(
            successful = summary.success_count,
            total = summary.total_count,
            "batch complete"
        );
        summary
    }

    async fn send_item(&self, index: usize, request: &SendRequest) -> BatchItemResult {
        match self.gateway.send_request(request).await {
            Ok(result) => BatchItemResult {
                phone: request.phone.clone(),
                success: result.success,
                message: result.message,
            },
            Err(err) => {
                warn!(index, phone = %request.phone, error = %err, "batch item failed");
                BatchItemResult {
                    phone: request.phone.clone(),
                    success: false,
                    message: err.to_string(),
                }
            }
        }
    }
}
