use super::timeout::bounded;
use deadline_notifier_domain::{ReminderKind, ReminderLedgerEntry, UserReminderSettings, ID};
use deadline_notifier_infra::{Config, NotifierContext};
use std::collections::HashMap;

/// The settings a `User` gets the first time they are read
pub fn default_settings(user_id: ID, config: &Config) -> UserReminderSettings {
    let mut settings = UserReminderSettings::new(user_id);
    settings.reminder_minutes_before = config.default_reminder_minutes_before;
    settings.daily_summary_time = config.default_daily_summary_time;
    settings
}

/// Access to reminder settings and the idempotency ledger.
///
/// Settings are cached for the lifetime of the store, which is meant to be a
/// single job run. `Task` state is never cached.
pub struct ReminderStateStore<'a> {
    ctx: &'a NotifierContext,
    settings_cache: HashMap<ID, UserReminderSettings>,
}

impl<'a> ReminderStateStore<'a> {
    pub fn new(ctx: &'a NotifierContext) -> Self {
        Self {
            ctx,
            settings_cache: HashMap::new(),
        }
    }

    /// Returns the settings of the `User`, storing the defaults if there are none yet
    pub async fn get_settings(&mut self, user_id: &ID) -> anyhow::Result<UserReminderSettings> {
        if let Some(settings) = self.settings_cache.get(user_id) {
            return Ok(settings.clone());
        }

        let defaults = default_settings(*user_id, &self.ctx.config);
        let settings = bounded(
            self.ctx.config.call_timeout,
            self.ctx.repos.user_settings.find_or_insert(&defaults),
        )
        .await?;
        self.settings_cache.insert(*user_id, settings.clone());
        Ok(settings)
    }

    pub async fn update_last_reminder_sent(
        &self,
        task_id: &ID,
        kind: ReminderKind,
        at: i64,
    ) -> anyhow::Result<()> {
        let entry = ReminderLedgerEntry {
            task_id: *task_id,
            kind,
            sent_at: at,
        };
        bounded(
            self.ctx.config.call_timeout,
            self.ctx.repos.reminder_ledger.record_sent(&entry),
        )
        .await
    }

    pub async fn users_with_reminders_enabled(&self) -> anyhow::Result<Vec<ID>> {
        bounded(
            self.ctx.config.call_timeout,
            self.ctx.repos.user_settings.find_user_ids_with_reminders_enabled(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_creates_settings_lazily_with_configured_defaults() {
        let mut ctx = NotifierContext::create_inmemory();
        ctx.config.default_reminder_minutes_before = 30;
        let user_id = ID::default();

        let mut store = ReminderStateStore::new(&ctx);
        let settings = store.get_settings(&user_id).await.expect("To get settings");
        assert_eq!(settings.reminder_minutes_before, 30);
        assert!(settings.reminders_enabled);

        let stored = ctx
            .repos
            .user_settings
            .find(&user_id)
            .await
            .expect("To find settings");
        assert_eq!(stored, Some(settings));
        assert_eq!(
            store
                .users_with_reminders_enabled()
                .await
                .expect("To find users"),
            vec![user_id]
        );
    }

    #[tokio::test]
    async fn it_caches_settings_for_its_lifetime() {
        let ctx = NotifierContext::create_inmemory();
        let user_id = ID::default();

        let mut store = ReminderStateStore::new(&ctx);
        let mut settings = store.get_settings(&user_id).await.expect("To get settings");

        settings.reminders_enabled = false;
        ctx.repos
            .user_settings
            .save(&settings)
            .await
            .expect("To save settings");

        assert!(store.get_settings(&user_id).await.unwrap().reminders_enabled);
        let mut fresh_store = ReminderStateStore::new(&ctx);
        assert!(!fresh_store.get_settings(&user_id).await.unwrap().reminders_enabled);
    }
}
