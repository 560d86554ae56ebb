use super::{ITaskRepo, ReminderCheckQuery};
use deadline_notifier_domain::{Task, TaskStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresTaskRepo {
    pool: PgPool,
}

impl PostgresTaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRaw {
    task_uid: Uuid,
    owner_uid: Uuid,
    title: String,
    deadline: Option<i64>,
    status: String,
    completed_at: Option<i64>,
}

impl From<TaskRaw> for Task {
    fn from(raw: TaskRaw) -> Self {
        Self {
            id: raw.task_uid.into(),
            owner_id: raw.owner_uid.into(),
            title: raw.title,
            deadline: raw.deadline,
            status: TaskStatus::from(raw.status.as_str()),
            completed_at: raw.completed_at,
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for PostgresTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks
            (task_uid, owner_uid, title, deadline, status, completed_at)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(task.id.inner_ref())
        .bind(task.owner_id.inner_ref())
        .bind(&task.title)
        .bind(task.deadline)
        .bind(task.status.as_str())
        .bind(task.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, task: &Task) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET owner_uid = $2,
            title = $3,
            deadline = $4,
            status = $5,
            completed_at = $6
            WHERE task_uid = $1
            "#,
        )
        .bind(task.id.inner_ref())
        .bind(task.owner_id.inner_ref())
        .bind(&task.title)
        .bind(task.deadline)
        .bind(task.status.as_str())
        .bind(task.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, task_id: &ID) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, TaskRaw>(
            r#"
            DELETE FROM tasks AS t
            WHERE t.task_uid = $1
            RETURNING *
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(task.map(|t| t.into()))
    }

    async fn find(&self, task_id: &ID) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks AS t
            WHERE t.task_uid = $1
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(task.map(|t| t.into()))
    }

    async fn find_needing_reminder_check(
        &self,
        query: &ReminderCheckQuery,
    ) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks AS t
            WHERE t.status = 'open' AND
            t.deadline >= $1 AND
            t.deadline <= $2 AND
            ($3::uuid IS NULL OR t.task_uid > $3)
            ORDER BY t.task_uid
            LIMIT $4
            "#,
        )
        .bind(query.deadline_from)
        .bind(query.deadline_to)
        .bind(query.after.as_ref().map(|id| *id.inner_ref()))
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks.into_iter().map(|t| t.into()).collect())
    }

    async fn find_open_due_before(&self, user_id: &ID, before: i64) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks AS t
            WHERE t.owner_uid = $1 AND
            t.status = 'open' AND
            t.deadline < $2
            ORDER BY t.deadline
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(before)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks.into_iter().map(|t| t.into()).collect())
    }

    async fn count_completed_between(
        &self,
        user_id: &ID,
        start: i64,
        end: i64,
    ) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tasks AS t
            WHERE t.owner_uid = $1 AND
            t.status = 'done' AND
            t.completed_at >= $2 AND
            t.completed_at < $3
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
