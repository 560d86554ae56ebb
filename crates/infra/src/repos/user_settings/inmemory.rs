use super::IUserSettingsRepo;
use crate::repos::shared::inmemory_repo::*;
use deadline_notifier_domain::{UserReminderSettings, ID};

pub struct InMemoryUserSettingsRepo {
    settings: std::sync::Mutex<Vec<UserReminderSettings>>,
}

impl InMemoryUserSettingsRepo {
    pub fn new() -> Self {
        Self {
            settings: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IUserSettingsRepo for InMemoryUserSettingsRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<UserReminderSettings>> {
        Ok(find(user_id, &self.settings))
    }

    async fn find_or_insert(
        &self,
        defaults: &UserReminderSettings,
    ) -> anyhow::Result<UserReminderSettings> {
        Ok(insert_if_absent(defaults, &self.settings, |s| {
            s.user_id == defaults.user_id
        }))
    }

    async fn save(&self, settings: &UserReminderSettings) -> anyhow::Result<()> {
        save(settings, &self.settings);
        Ok(())
    }

    async fn find_user_ids_with_reminders_enabled(&self) -> anyhow::Result<Vec<ID>> {
        Ok(find_by(&self.settings, |s| s.reminders_enabled)
            .into_iter()
            .map(|s| s.user_id)
            .collect())
    }
}
