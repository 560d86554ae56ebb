use super::IUserSettingsRepo;
use chrono::NaiveTime;
use deadline_notifier_domain::{UserReminderSettings, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresUserSettingsRepo {
    pool: PgPool,
}

impl PostgresUserSettingsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserSettingsRaw {
    user_uid: Uuid,
    reminders_enabled: bool,
    daily_summary_time: NaiveTime,
    reminder_minutes_before: i32,
}

impl From<UserSettingsRaw> for UserReminderSettings {
    fn from(raw: UserSettingsRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            reminders_enabled: raw.reminders_enabled,
            daily_summary_time: raw.daily_summary_time,
            // The column has a non negative check constraint
            reminder_minutes_before: u32::try_from(raw.reminder_minutes_before).unwrap_or(0),
        }
    }
}

#[async_trait::async_trait]
impl IUserSettingsRepo for PostgresUserSettingsRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<UserReminderSettings>> {
        let settings = sqlx::query_as::<_, UserSettingsRaw>(
            r#"
            SELECT * FROM user_reminder_settings AS s
            WHERE s.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings.map(|s| s.into()))
    }

    async fn find_or_insert(
        &self,
        defaults: &UserReminderSettings,
    ) -> anyhow::Result<UserReminderSettings> {
        sqlx::query(
            r#"
            INSERT INTO user_reminder_settings
            (user_uid, reminders_enabled, daily_summary_time, reminder_minutes_before)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (user_uid) DO NOTHING
            "#,
        )
        .bind(defaults.user_id.inner_ref())
        .bind(defaults.reminders_enabled)
        .bind(defaults.daily_summary_time)
        .bind(i32::try_from(defaults.reminder_minutes_before)?)
        .execute(&self.pool)
        .await?;

        match self.find(&defaults.user_id).await? {
            Some(settings) => Ok(settings),
            None => Err(anyhow::anyhow!(
                "Reminder settings for user {} vanished after insert",
                defaults.user_id
            )),
        }
    }

    async fn save(&self, settings: &UserReminderSettings) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE user_reminder_settings
            SET reminders_enabled = $2,
            daily_summary_time = $3,
            reminder_minutes_before = $4
            WHERE user_uid = $1
            "#,
        )
        .bind(settings.user_id.inner_ref())
        .bind(settings.reminders_enabled)
        .bind(settings.daily_summary_time)
        .bind(i32::try_from(settings.reminder_minutes_before)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_ids_with_reminders_enabled(&self) -> anyhow::Result<Vec<ID>> {
        let user_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT s.user_uid FROM user_reminder_settings AS s
            WHERE s.reminders_enabled
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(user_ids.into_iter().map(ID::from).collect())
    }
}
