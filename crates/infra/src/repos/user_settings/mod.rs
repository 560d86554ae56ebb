mod inmemory;
mod postgres;

use deadline_notifier_domain::{UserReminderSettings, ID};
pub use inmemory::InMemoryUserSettingsRepo;
pub use postgres::PostgresUserSettingsRepo;

#[async_trait::async_trait]
pub trait IUserSettingsRepo: Send + Sync {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<UserReminderSettings>>;
    /// Stores `defaults` if the `User` has no settings yet and returns the
    /// settings that are stored afterwards. Concurrent callers converge on one row.
    async fn find_or_insert(
        &self,
        defaults: &UserReminderSettings,
    ) -> anyhow::Result<UserReminderSettings>;
    async fn save(&self, settings: &UserReminderSettings) -> anyhow::Result<()>;
    async fn find_user_ids_with_reminders_enabled(&self) -> anyhow::Result<Vec<ID>>;
}
