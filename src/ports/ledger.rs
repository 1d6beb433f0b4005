use async_trait::async_trait;

use crate::domain::transaction::Transaction;
use crate::error::Result;

/// Append-only audit record of settlement attempts. Entries are never
/// mutated or deleted, independent of what later happens to the booking.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Append one settlement attempt and return its transaction id.
    async fn record(&self, transaction: Transaction) -> Result<String>;

    /// Read-back for audit and reconciliation.
    async fn entries_for_listing(&self, listing_id: &str) -> Result<Vec<Transaction>>;
}
