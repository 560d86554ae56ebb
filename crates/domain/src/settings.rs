use crate::shared::entity::{Entity, ID};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REMINDER_MINUTES_BEFORE: u32 = 60;
/// Upper bound for how far ahead of a deadline a user can ask to be reminded (one week)
pub const MAX_REMINDER_MINUTES_BEFORE: u32 = 60 * 24 * 7;

pub fn default_daily_summary_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

/// Per user reminder preferences. A row is created with the configured
/// defaults the first time the settings of a `User` are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReminderSettings {
    pub user_id: ID,
    pub reminders_enabled: bool,
    pub daily_summary_time: NaiveTime,
    pub reminder_minutes_before: u32,
}

impl UserReminderSettings {
    pub fn new(user_id: ID) -> Self {
        Self {
            user_id,
            reminders_enabled: true,
            daily_summary_time: default_daily_summary_time(),
            reminder_minutes_before: DEFAULT_REMINDER_MINUTES_BEFORE,
        }
    }

    pub fn reminder_lead_millis(&self) -> i64 {
        i64::from(self.reminder_minutes_before) * 60 * 1000
    }
}

impl Entity for UserReminderSettings {
    fn id(&self) -> &ID {
        &self.user_id
    }
}

/// A partial update of `UserReminderSettings`. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserReminderSettingsPatch {
    pub reminders_enabled: Option<bool>,
    pub daily_summary_time: Option<NaiveTime>,
    pub reminder_minutes_before: Option<u32>,
}

impl UserReminderSettingsPatch {
    pub fn apply(&self, settings: &mut UserReminderSettings) {
        if let Some(enabled) = self.reminders_enabled {
            settings.reminders_enabled = enabled;
        }
        if let Some(time) = self.daily_summary_time {
            settings.daily_summary_time = time;
        }
        if let Some(minutes) = self.reminder_minutes_before {
            settings.reminder_minutes_before = minutes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_settings_have_defaults() {
        let settings = UserReminderSettings::new(ID::default());
        assert!(settings.reminders_enabled);
        assert_eq!(
            settings.daily_summary_time,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(settings.reminder_minutes_before, 60);
        assert_eq!(settings.reminder_lead_millis(), 1000 * 60 * 60);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut settings = UserReminderSettings::new(ID::default());
        let patch = UserReminderSettingsPatch {
            reminders_enabled: Some(false),
            ..Default::default()
        };
        patch.apply(&mut settings);
        assert!(!settings.reminders_enabled);
        assert_eq!(settings.reminder_minutes_before, 60);
    }
}
