use crate::shared::{timeout::bounded, usecase::UseCase};
use deadline_notifier_domain::{date::day_bounds, DigestSnapshot, Task, ID};
use deadline_notifier_infra::NotifierContext;
use tracing::error;

/// Computes the digest of a `User` for the calendar day containing `now`.
/// Days are calendar days in the reference timezone.
#[derive(Debug)]
pub struct BuildDigestUseCase {
    pub user_id: ID,
    pub now: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    InvalidTimestamp(i64),
}

#[async_trait::async_trait]
impl UseCase for BuildDigestUseCase {
    type Response = DigestSnapshot;

    type Error = UseCaseError;

    const NAME: &'static str = "BuildDigest";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let bounds = day_bounds(self.now, &ctx.config.reference_timezone)
            .ok_or(UseCaseError::InvalidTimestamp(self.now))?;

        let open = bounded(
            ctx.config.call_timeout,
            ctx.repos
                .tasks
                .find_open_due_before(&self.user_id, bounds.tomorrow_start),
        )
        .await
        .map_err(|e| {
            error!("Unable to fetch open tasks. Err: {:?}", e);
            UseCaseError::StorageError
        })?;

        let (mut overdue, mut due_today): (Vec<Task>, Vec<Task>) = open
            .into_iter()
            .partition(|t| t.deadline.map_or(false, |d| d < bounds.today_start));
        overdue.sort_by_key(|t| t.deadline);
        due_today.sort_by_key(|t| t.deadline);

        let completed_yesterday_count = bounded(
            ctx.config.call_timeout,
            ctx.repos.tasks.count_completed_between(
                &self.user_id,
                bounds.yesterday_start,
                bounds.today_start,
            ),
        )
        .await
        .map_err(|e| {
            error!("Unable to count completed tasks. Err: {:?}", e);
            UseCaseError::StorageError
        })?;

        Ok(DigestSnapshot {
            user_id: self.user_id,
            day_start: bounds.today_start,
            due_today,
            overdue,
            completed_yesterday_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;

    const HOUR: i64 = 1000 * 60 * 60;
    // Sun Feb 21 2021 12:00:00 GMT+0000
    const NOW: i64 = 1613908800000;
    // Sun Feb 21 2021 00:00:00 GMT+0000
    const TODAY: i64 = 1613865600000;

    async fn add_task(ctx: &NotifierContext, user_id: ID, title: &str, deadline: i64) -> Task {
        let task = Task::new(user_id, title, Some(deadline));
        ctx.repos.tasks.insert(&task).await.unwrap();
        task
    }

    async fn add_completed_task(ctx: &NotifierContext, user_id: ID, completed_at: i64) {
        let mut task = Task::new(user_id, "Done", Some(completed_at));
        task.complete(completed_at);
        ctx.repos.tasks.insert(&task).await.unwrap();
    }

    #[tokio::test]
    async fn it_builds_digest() {
        let mut ctx = NotifierContext::create_inmemory();
        ctx.config.reference_timezone = chrono_tz::UTC;
        let user_id = ID::default();

        let later_today = add_task(&ctx, user_id, "Later today", NOW + 4 * HOUR).await;
        let earlier_today = add_task(&ctx, user_id, "Earlier today", NOW - 2 * HOUR).await;
        let overdue = add_task(&ctx, user_id, "Overdue", TODAY - 24 * HOUR).await;
        add_task(&ctx, user_id, "Tomorrow", TODAY + 24 * HOUR).await;
        add_task(&ctx, ID::default(), "Someone else's", NOW).await;
        for hours in &[1, 12, 23] {
            add_completed_task(&ctx, user_id, TODAY - hours * HOUR).await;
        }
        // Completed today and two days ago
        add_completed_task(&ctx, user_id, TODAY + HOUR).await;
        add_completed_task(&ctx, user_id, TODAY - 30 * HOUR).await;

        let digest = execute(BuildDigestUseCase { user_id, now: NOW }, &ctx)
            .await
            .unwrap();

        assert_eq!(digest.day_start, TODAY);
        assert_eq!(
            digest.due_today.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![earlier_today.id, later_today.id]
        );
        assert_eq!(
            digest.overdue.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![overdue.id]
        );
        assert_eq!(digest.completed_yesterday_count, 3);
        assert!(!digest.is_empty());
    }

    #[tokio::test]
    async fn day_bounds_follow_the_reference_timezone() {
        let mut ctx = NotifierContext::create_inmemory();
        ctx.config.reference_timezone = chrono_tz::Asia::Tokyo;
        let user_id = ID::default();
        // NOW is 21:00 in Tokyo, where the day started at 15:00 UTC the day before
        add_task(&ctx, user_id, "Early today", NOW - 20 * HOUR).await;
        add_task(&ctx, user_id, "Late today", NOW + 2 * HOUR).await;
        add_task(&ctx, user_id, "Tomorrow", NOW + 4 * HOUR).await;

        let digest = execute(BuildDigestUseCase { user_id, now: NOW }, &ctx)
            .await
            .unwrap();

        assert_eq!(
            digest.due_today.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["Early today", "Late today"]
        );
        assert!(digest.overdue.is_empty());
    }
}
