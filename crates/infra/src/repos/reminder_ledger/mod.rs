mod inmemory;
mod postgres;

use deadline_notifier_domain::{ReminderLedgerEntry, ID};
pub use inmemory::InMemoryReminderLedgerRepo;
pub use postgres::PostgresReminderLedgerRepo;

/// The durable record of which reminders have been sent. This is the only
/// thing preventing duplicate reminders across sweeps and restarts.
#[async_trait::async_trait]
pub trait IReminderLedgerRepo: Send + Sync {
    async fn find_by_tasks(&self, task_ids: &[ID]) -> anyhow::Result<Vec<ReminderLedgerEntry>>;
    /// Upsert keyed by `(task_id, kind)`. The stored `sent_at` is never
    /// moved to an earlier value.
    async fn record_sent(&self, entry: &ReminderLedgerEntry) -> anyhow::Result<()>;
}
