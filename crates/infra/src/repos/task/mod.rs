mod inmemory;
mod postgres;

use deadline_notifier_domain::{Task, ID};
pub use inmemory::InMemoryTaskRepo;
pub use postgres::PostgresTaskRepo;

/// Keyset paginated query for open `Task`s that might owe a reminder
#[derive(Debug, Clone)]
pub struct ReminderCheckQuery {
    /// Only `Task`s with a deadline at or after this timestamp
    pub deadline_from: i64,
    /// Only `Task`s with a deadline at or before this timestamp
    pub deadline_to: i64,
    /// Only `Task`s with an id greater than this cursor
    pub after: Option<ID>,
    pub limit: usize,
}

#[async_trait::async_trait]
pub trait ITaskRepo: Send + Sync {
    async fn insert(&self, task: &Task) -> anyhow::Result<()>;
    async fn save(&self, task: &Task) -> anyhow::Result<()>;
    async fn delete(&self, task_id: &ID) -> anyhow::Result<Option<Task>>;
    async fn find(&self, task_id: &ID) -> anyhow::Result<Option<Task>>;
    /// Open `Task`s with a deadline, ordered by id
    async fn find_needing_reminder_check(
        &self,
        query: &ReminderCheckQuery,
    ) -> anyhow::Result<Vec<Task>>;
    /// Open `Task`s of the `User` with a deadline before `before`
    async fn find_open_due_before(&self, user_id: &ID, before: i64) -> anyhow::Result<Vec<Task>>;
    /// Number of `Task`s of the `User` completed in `[start, end)`
    async fn count_completed_between(
        &self,
        user_id: &ID,
        start: i64,
        end: i64,
    ) -> anyhow::Result<i64>;
}
