use super::build_digest::BuildDigestUseCase;
use crate::{
    notification::{deactivate_recipient, deliver, render_digest, DeliveryResult},
    shared::{
        reminder_state::ReminderStateStore,
        timeout::bounded,
        usecase::{execute, UseCase},
    },
};
use deadline_notifier_domain::Recipient;
use deadline_notifier_infra::NotifierContext;
use futures::{stream, StreamExt};
use tracing::{error, info};

/// The daily digest job: one digest per active recipient whose `User` has
/// reminders enabled.
#[derive(Debug)]
pub struct SendDailyDigestsUseCase;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestReport {
    pub recipients: usize,
    pub sent: usize,
    /// Nothing to report for the day
    pub empty: usize,
    pub failed: usize,
    pub unreachable: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

enum DigestOutcome {
    Sent,
    Empty,
    Failed,
    Unreachable,
}

#[async_trait::async_trait]
impl UseCase for SendDailyDigestsUseCase {
    type Response = DigestReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDailyDigests";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();

        let user_ids = ReminderStateStore::new(ctx)
            .users_with_reminders_enabled()
            .await
            .map_err(|e| {
                error!("Unable to fetch users with reminders enabled. Err: {:?}", e);
                UseCaseError::StorageError
            })?;
        if user_ids.is_empty() {
            return Ok(DigestReport::default());
        }

        let recipients = bounded(
            ctx.config.call_timeout,
            ctx.repos.recipients.find_many(&user_ids),
        )
        .await
        .map_err(|e| {
            error!("Unable to fetch recipients. Err: {:?}", e);
            UseCaseError::StorageError
        })?
        .into_iter()
        .filter(|r| r.active)
        .collect::<Vec<_>>();

        let mut report = DigestReport {
            recipients: recipients.len(),
            ..Default::default()
        };
        let outcomes = stream::iter(recipients.into_iter())
            .map(|recipient| async move { send_digest(ctx, &recipient, now).await })
            .buffer_unordered(ctx.config.delivery_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;
        for outcome in outcomes {
            match outcome {
                DigestOutcome::Sent => report.sent += 1,
                DigestOutcome::Empty => report.empty += 1,
                DigestOutcome::Failed => report.failed += 1,
                DigestOutcome::Unreachable => report.unreachable += 1,
            }
        }

        info!(
            recipients = report.recipients,
            sent = report.sent,
            empty = report.empty,
            failed = report.failed,
            unreachable = report.unreachable,
            "Daily digests completed"
        );

        Ok(report)
    }
}

async fn send_digest(ctx: &NotifierContext, recipient: &Recipient, now: i64) -> DigestOutcome {
    let snapshot = match execute(
        BuildDigestUseCase {
            user_id: recipient.user_id,
            now,
        },
        ctx,
    )
    .await
    {
        Ok(snapshot) => snapshot,
        Err(_) => return DigestOutcome::Failed,
    };

    let message = match render_digest(&snapshot, &ctx.config.reference_timezone) {
        Some(message) => message,
        None => return DigestOutcome::Empty,
    };

    match deliver(ctx, recipient, &message).await {
        DeliveryResult::Sent => DigestOutcome::Sent,
        DeliveryResult::RecipientUnreachable => {
            deactivate_recipient(ctx, &recipient.user_id).await;
            DigestOutcome::Unreachable
        }
        DeliveryResult::TransientFailure => DigestOutcome::Failed,
    }
}
