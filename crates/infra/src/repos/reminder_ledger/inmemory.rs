use super::IReminderLedgerRepo;
use crate::repos::shared::inmemory_repo::*;
use deadline_notifier_domain::{ReminderLedgerEntry, ID};

pub struct InMemoryReminderLedgerRepo {
    entries: std::sync::Mutex<Vec<ReminderLedgerEntry>>,
}

impl InMemoryReminderLedgerRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IReminderLedgerRepo for InMemoryReminderLedgerRepo {
    async fn find_by_tasks(&self, task_ids: &[ID]) -> anyhow::Result<Vec<ReminderLedgerEntry>> {
        Ok(find_by(&self.entries, |e| task_ids.contains(&e.task_id)))
    }

    async fn record_sent(&self, entry: &ReminderLedgerEntry) -> anyhow::Result<()> {
        upsert_by(
            entry,
            &self.entries,
            |e| e.task_id == entry.task_id && e.kind == entry.kind,
            |stored, new| stored.sent_at = stored.sent_at.max(new.sent_at),
        );
        Ok(())
    }
}
