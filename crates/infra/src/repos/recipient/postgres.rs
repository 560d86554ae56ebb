use super::IRecipientRepo;
use deadline_notifier_domain::{Recipient, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresRecipientRepo {
    pool: PgPool,
}

impl PostgresRecipientRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecipientRaw {
    user_uid: Uuid,
    chat_id: String,
    active: bool,
}

impl From<RecipientRaw> for Recipient {
    fn from(raw: RecipientRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            chat_id: raw.chat_id,
            active: raw.active,
        }
    }
}

#[async_trait::async_trait]
impl IRecipientRepo for PostgresRecipientRepo {
    async fn save(&self, recipient: &Recipient) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipients
            (user_uid, chat_id, active)
            VALUES($1, $2, $3)
            ON CONFLICT (user_uid) DO UPDATE
            SET chat_id = EXCLUDED.chat_id,
            active = EXCLUDED.active
            "#,
        )
        .bind(recipient.user_id.inner_ref())
        .bind(&recipient.chat_id)
        .bind(recipient.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Recipient>> {
        let user_ids = user_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();

        let recipients = sqlx::query_as::<_, RecipientRaw>(
            r#"
            SELECT * FROM recipients AS r
            WHERE r.user_uid = ANY($1)
            "#,
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipients.into_iter().map(|r| r.into()).collect())
    }

    async fn set_active(&self, user_id: &ID, active: bool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE recipients
            SET active = $2
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
