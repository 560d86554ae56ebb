use super::{ITaskRepo, ReminderCheckQuery};
use crate::repos::shared::inmemory_repo::*;
use deadline_notifier_domain::{Task, TaskStatus, ID};

pub struct InMemoryTaskRepo {
    tasks: std::sync::Mutex<Vec<Task>>,
}

impl InMemoryTaskRepo {
    pub fn new() -> Self {
        Self {
            tasks: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for InMemoryTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        insert(task, &self.tasks);
        Ok(())
    }

    async fn save(&self, task: &Task) -> anyhow::Result<()> {
        save(task, &self.tasks);
        Ok(())
    }

    async fn delete(&self, task_id: &ID) -> anyhow::Result<Option<Task>> {
        Ok(delete(task_id, &self.tasks))
    }

    async fn find(&self, task_id: &ID) -> anyhow::Result<Option<Task>> {
        Ok(find(task_id, &self.tasks))
    }

    async fn find_needing_reminder_check(
        &self,
        query: &ReminderCheckQuery,
    ) -> anyhow::Result<Vec<Task>> {
        let mut tasks = find_by(&self.tasks, |t| {
            t.status == TaskStatus::Open
                && matches!(t.deadline, Some(deadline) if query.deadline_from <= deadline && deadline <= query.deadline_to)
                && query.after.map_or(true, |after| t.id > after)
        });
        tasks.sort_by(|t1, t2| t1.id.cmp(&t2.id));
        tasks.truncate(query.limit);
        Ok(tasks)
    }

    async fn find_open_due_before(&self, user_id: &ID, before: i64) -> anyhow::Result<Vec<Task>> {
        let mut tasks = find_by(&self.tasks, |t| {
            t.owner_id == *user_id
                && t.status == TaskStatus::Open
                && matches!(t.deadline, Some(deadline) if deadline < before)
        });
        tasks.sort_by_key(|t| t.deadline);
        Ok(tasks)
    }

    async fn count_completed_between(
        &self,
        user_id: &ID,
        start: i64,
        end: i64,
    ) -> anyhow::Result<i64> {
        let tasks = find_by(&self.tasks, |t| {
            t.owner_id == *user_id
                && t.status == TaskStatus::Done
                && matches!(t.completed_at, Some(at) if start <= at && at < end)
        });
        Ok(tasks.len() as i64)
    }
}
