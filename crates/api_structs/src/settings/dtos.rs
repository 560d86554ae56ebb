use deadline_notifier_domain::{UserReminderSettings, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReminderSettingsDTO {
    pub user_id: ID,
    pub reminders_enabled: bool,
    /// Formatted as `HH:MM`
    pub daily_summary_time: String,
    pub reminder_minutes_before: u32,
}

impl UserReminderSettingsDTO {
    pub fn new(settings: UserReminderSettings) -> Self {
        Self {
            user_id: settings.user_id,
            reminders_enabled: settings.reminders_enabled,
            daily_summary_time: settings.daily_summary_time.format("%H:%M").to_string(),
            reminder_minutes_before: settings.reminder_minutes_before,
        }
    }
}
