use crate::dtos::UserReminderSettingsDTO;
use deadline_notifier_domain::{UserReminderSettings, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReminderSettingsResponse {
    pub settings: UserReminderSettingsDTO,
}

impl UserReminderSettingsResponse {
    pub fn new(settings: UserReminderSettings) -> Self {
        Self {
            settings: UserReminderSettingsDTO::new(settings),
        }
    }
}

pub mod get_reminder_settings {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    pub type APIResponse = UserReminderSettingsResponse;
}

pub mod update_reminder_settings {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub reminders_enabled: Option<bool>,
        /// Formatted as `HH:MM`
        #[serde(default)]
        pub daily_summary_time: Option<String>,
        #[serde(default)]
        pub reminder_minutes_before: Option<u32>,
    }

    pub type APIResponse = UserReminderSettingsResponse;
}
