use super::IReminderLedgerRepo;
use deadline_notifier_domain::{ReminderKind, ReminderLedgerEntry, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresReminderLedgerRepo {
    pool: PgPool,
}

impl PostgresReminderLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderLedgerRaw {
    task_uid: Uuid,
    kind: String,
    sent_at: i64,
}

#[async_trait::async_trait]
impl IReminderLedgerRepo for PostgresReminderLedgerRepo {
    async fn find_by_tasks(&self, task_ids: &[ID]) -> anyhow::Result<Vec<ReminderLedgerEntry>> {
        let task_ids = task_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();

        let entries = sqlx::query_as::<_, ReminderLedgerRaw>(
            r#"
            SELECT * FROM task_reminders_sent AS r
            WHERE r.task_uid = ANY($1)
            "#,
        )
        .bind(&task_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries
            .into_iter()
            .filter_map(|raw| match raw.kind.parse::<ReminderKind>() {
                Ok(kind) => Some(ReminderLedgerEntry {
                    task_id: raw.task_uid.into(),
                    kind,
                    sent_at: raw.sent_at,
                }),
                Err(e) => {
                    warn!("Ignoring reminder ledger row: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn record_sent(&self, entry: &ReminderLedgerEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO task_reminders_sent
            (task_uid, kind, sent_at)
            VALUES($1, $2, $3)
            ON CONFLICT (task_uid, kind) DO UPDATE
            SET sent_at = GREATEST(task_reminders_sent.sent_at, EXCLUDED.sent_at)
            "#,
        )
        .bind(entry.task_id.inner_ref())
        .bind(entry.kind.as_str())
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
