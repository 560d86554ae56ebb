use crate::shared::{reminder_state::ReminderStateStore, timeout::bounded, usecase::UseCase};
use deadline_notifier_domain::{
    owed_reminder, ReminderEvent, ReminderLog, MAX_REMINDER_MINUTES_BEFORE,
};
use deadline_notifier_infra::{NotifierContext, ReminderCheckQuery};
use tracing::error;

/// Finds every reminder that is owed at `now`.
///
/// Candidate `Task`s are fetched in pages of `reminder_batch_size` and every
/// page is evaluated before the next one is fetched. Nothing is written, so a
/// failing page leaves no partial state behind.
#[derive(Debug)]
pub struct FindDueRemindersUseCase {
    pub now: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for FindDueRemindersUseCase {
    type Response = Vec<ReminderEvent>;

    type Error = UseCaseError;

    const NAME: &'static str = "FindDueReminders";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let timeout = ctx.config.call_timeout;
        let grace_millis = ctx.config.reminder_grace_millis();
        let mut state = ReminderStateStore::new(ctx);

        let mut query = ReminderCheckQuery {
            // Older deadlines are outside of every reminder window
            deadline_from: self.now - grace_millis,
            // No lead time reaches further ahead
            deadline_to: self.now + max_lead_millis(ctx),
            after: None,
            limit: ctx.config.reminder_batch_size,
        };
        let mut due = Vec::new();

        loop {
            let batch = bounded(timeout, ctx.repos.tasks.find_needing_reminder_check(&query))
                .await
                .map_err(|e| {
                    error!("Unable to fetch tasks needing a reminder check. Err: {:?}", e);
                    UseCaseError::StorageError
                })?;
            if batch.is_empty() {
                break;
            }

            let task_ids = batch.iter().map(|t| t.id).collect::<Vec<_>>();
            let ledger = bounded(timeout, ctx.repos.reminder_ledger.find_by_tasks(&task_ids))
                .await
                .map_err(|e| {
                    error!("Unable to fetch sent reminders. Err: {:?}", e);
                    UseCaseError::StorageError
                })?;

            for task in &batch {
                let settings = state.get_settings(&task.owner_id).await.map_err(|e| {
                    error!(
                        "Unable to get reminder settings for user {}. Err: {:?}",
                        task.owner_id, e
                    );
                    UseCaseError::StorageError
                })?;
                let log = ReminderLog::from_entries(ledger.iter().filter(|e| e.task_id == task.id));
                if let Some(reminder) = owed_reminder(task, &settings, &log, self.now, grace_millis) {
                    due.push(reminder);
                }
            }

            if batch.len() < query.limit {
                break;
            }
            query.after = batch.last().map(|t| t.id);
        }

        Ok(due)
    }
}

fn max_lead_millis(ctx: &NotifierContext) -> i64 {
    let minutes = MAX_REMINDER_MINUTES_BEFORE.max(ctx.config.default_reminder_minutes_before);
    i64::from(minutes) * 60 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use deadline_notifier_domain::{
        ReminderKind, ReminderLedgerEntry, Task, UserReminderSettings, ID,
    };

    const MINUTE: i64 = 1000 * 60;
    // Sun Feb 21 2021 00:00:00 GMT+0100
    const NOW: i64 = 1613862000000;

    async fn insert_task(ctx: &NotifierContext, owner_id: ID, deadline: i64) -> Task {
        let task = Task::new(owner_id, "Task", Some(deadline));
        ctx.repos.tasks.insert(&task).await.expect("To insert task");
        task
    }

    fn setup() -> NotifierContext {
        let mut ctx = NotifierContext::create_inmemory();
        ctx.config.reminder_grace = std::time::Duration::from_secs(5 * 60);
        ctx.config.reminder_batch_size = 2;
        ctx
    }

    #[tokio::test]
    async fn it_finds_reminders_across_batches() {
        let ctx = setup();
        let user_id = ID::default();
        let before = insert_task(&ctx, user_id, NOW + 30 * MINUTE).await;
        let at_deadline = insert_task(&ctx, user_id, NOW - MINUTE).await;
        insert_task(&ctx, user_id, NOW + 90 * MINUTE).await;
        insert_task(&ctx, user_id, NOW - 10 * MINUTE).await;
        let other_user = insert_task(&ctx, ID::default(), NOW + 10 * MINUTE).await;

        let mut due = execute(FindDueRemindersUseCase { now: NOW }, &ctx)
            .await
            .expect("To find reminders");
        due.sort_by_key(|r| r.task.deadline);

        let found = due
            .iter()
            .map(|r| (r.task.id, r.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                (at_deadline.id, ReminderKind::AtDeadline),
                (other_user.id, ReminderKind::Before),
                (before.id, ReminderKind::Before),
            ]
        );
    }

    #[tokio::test]
    async fn it_skips_reminders_recorded_as_sent() {
        let ctx = setup();
        let user_id = ID::default();
        let task = insert_task(&ctx, user_id, NOW + 30 * MINUTE).await;
        ctx.repos
            .reminder_ledger
            .record_sent(&ReminderLedgerEntry {
                task_id: task.id,
                kind: ReminderKind::Before,
                sent_at: NOW - MINUTE,
            })
            .await
            .expect("To record reminder");

        let due = execute(FindDueRemindersUseCase { now: NOW }, &ctx)
            .await
            .expect("To find reminders");
        assert!(due.is_empty());

        // The at deadline reminder is still owed later on
        let due = execute(
            FindDueRemindersUseCase {
                now: NOW + 30 * MINUTE,
            },
            &ctx,
        )
        .await
        .expect("To find reminders");
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ReminderKind::AtDeadline);
    }

    #[tokio::test]
    async fn it_respects_user_settings() {
        let ctx = setup();
        let quiet_user = ID::default();
        let mut settings = UserReminderSettings::new(quiet_user);
        settings.reminders_enabled = false;
        ctx.repos
            .user_settings
            .find_or_insert(&settings)
            .await
            .expect("To insert settings");
        insert_task(&ctx, quiet_user, NOW + 30 * MINUTE).await;

        let short_lead_user = ID::default();
        let mut settings = UserReminderSettings::new(short_lead_user);
        settings.reminder_minutes_before = 15;
        ctx.repos
            .user_settings
            .find_or_insert(&settings)
            .await
            .expect("To insert settings");
        insert_task(&ctx, short_lead_user, NOW + 30 * MINUTE).await;
        let soon = insert_task(&ctx, short_lead_user, NOW + 10 * MINUTE).await;

        let due = execute(FindDueRemindersUseCase { now: NOW }, &ctx)
            .await
            .expect("To find reminders");
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task.id, soon.id);
    }

    #[tokio::test]
    async fn it_looks_as_far_ahead_as_the_longest_lead_time() {
        let mut ctx = setup();
        let day = 24 * 60 * MINUTE;
        ctx.config.default_reminder_minutes_before = 20 * 24 * 60;
        let task = insert_task(&ctx, ID::default(), NOW + 10 * day).await;

        let due = execute(FindDueRemindersUseCase { now: NOW }, &ctx)
            .await
            .expect("To find reminders");
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task.id, task.id);
    }

    #[tokio::test]
    async fn it_creates_missing_settings_with_defaults() {
        let ctx = setup();
        let user_id = ID::default();
        insert_task(&ctx, user_id, NOW + 30 * MINUTE).await;

        execute(FindDueRemindersUseCase { now: NOW }, &ctx)
            .await
            .expect("To find reminders");

        let settings = ctx
            .repos
            .user_settings
            .find(&user_id)
            .await
            .expect("To find settings")
            .expect("Settings to be created");
        assert!(settings.reminders_enabled);
    }
}
