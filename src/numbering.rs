//! Receipt number allocation.
//!
//! Numbers come from the store's sequence generator, scoped to the practitioner who owns the
//! receipt. When the generator cannot be reached a number is synthesized locally from the receipt
//! type and the current time in milliseconds. Two fallbacks generated in the same millisecond
//! collide, so fallback numbers are unique on a best-effort basis only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{receipt::ReceiptType, store::SequenceSource};

/// Synthesize a receipt number without the store, e.g. `PHY-1768467000000`.
pub fn fallback_number(receipt_type: ReceiptType, at: DateTime<Utc>) -> String {
    format!("{}-{}", receipt_type.number_prefix(), at.timestamp_millis())
}

/// Two-tier number allocation: the remote sequence first, a local number when it fails.
pub struct ReceiptNumberGenerator {
    source: Arc<dyn SequenceSource>,
}

impl ReceiptNumberGenerator {
    pub fn new(source: Arc<dyn SequenceSource>) -> Self {
        Self { source }
    }

    /// Allocate a number for a new receipt owned by `owner_id`.
    ///
    /// Never fails: any error from the sequence source is logged and replaced by
    /// [`fallback_number`].
    pub async fn next(&self, owner_id: &str, receipt_type: ReceiptType) -> String {
        match self.source.next_receipt_number(owner_id).await {
            Ok(number) => {
                debug!(owner_id, %number, "allocated receipt number from sequence");
                number
            }
            Err(e) => {
                let number = fallback_number(receipt_type, Utc::now());
                warn!(owner_id, %number, error = %e, "sequence unavailable, using local receipt number");
                number
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn fallback_uses_type_prefix_and_epoch_millis() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        assert_eq!(
            fallback_number(ReceiptType::Physiotherapy, at),
            format!("PHY-{}", at.timestamp_millis())
        );
        assert!(fallback_number(ReceiptType::Pilates, at).starts_with("PIL-"));
    }

    #[tokio::test]
    async fn uses_the_remote_sequence_when_available() {
        let store = Arc::new(MemoryStore::new());
        let generator = ReceiptNumberGenerator::new(store.clone());
        assert_eq!(generator.next("owner-1", ReceiptType::Pilates).await, "RCP-00001");
        assert_eq!(generator.next("owner-1", ReceiptType::Pilates).await, "RCP-00002");
        assert_eq!(generator.next("owner-2", ReceiptType::Pilates).await, "RCP-00001");
    }

    #[tokio::test]
    async fn falls_back_locally_when_the_sequence_fails() {
        let store = Arc::new(MemoryStore::new());
        store.set_failing(true);
        let generator = ReceiptNumberGenerator::new(store);
        let number = generator.next("owner-1", ReceiptType::Physiotherapy).await;
        let millis = number.strip_prefix("PHY-").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
