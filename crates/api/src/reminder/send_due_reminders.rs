use super::find_due_reminders::FindDueRemindersUseCase;
use crate::{
    notification::{deactivate_recipient, deliver, render_reminder, DeliveryResult},
    shared::{
        reminder_state::ReminderStateStore,
        timeout::bounded,
        usecase::{execute, UseCase},
    },
};
use deadline_notifier_domain::{Recipient, ReminderEvent, ID};
use deadline_notifier_infra::NotifierContext;
use futures::{stream, StreamExt};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// One sweep of the reminder job: finds the owed reminders and delivers them.
///
/// Reminders of different users are delivered concurrently, the reminders of a
/// single user one after another. A reminder is recorded in the ledger only
/// after it has been delivered.
#[derive(Debug)]
pub struct SendDueRemindersUseCase;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub due: usize,
    pub sent: usize,
    /// Delivered, but the ledger write failed
    pub unrecorded: usize,
    pub failed: usize,
    pub unreachable: usize,
    pub skipped: usize,
}

impl SweepReport {
    fn merge(mut self, other: SweepReport) -> Self {
        self.due += other.due;
        self.sent += other.sent;
        self.unrecorded += other.unrecorded;
        self.failed += other.failed;
        self.unreachable += other.unreachable;
        self.skipped += other.skipped;
        self
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for SendDueRemindersUseCase {
    type Response = SweepReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();

        let due = execute(FindDueRemindersUseCase { now }, ctx)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if due.is_empty() {
            debug!("No reminders are due");
            return Ok(SweepReport::default());
        }

        let mut per_user: HashMap<ID, Vec<ReminderEvent>> = HashMap::new();
        for reminder in due {
            per_user
                .entry(*reminder.user_id())
                .or_default()
                .push(reminder);
        }

        let user_ids = per_user.keys().copied().collect::<Vec<_>>();
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
        .map(|r| (r.user_id, r))
        .collect::<HashMap<_, _>>();

        let state = ReminderStateStore::new(ctx);
        let report = stream::iter(per_user.into_iter())
            .map(|(user_id, reminders)| {
                send_user_reminders(ctx, &state, recipients.get(&user_id), reminders, now)
            })
            .buffer_unordered(ctx.config.delivery_concurrency.max(1))
            .fold(SweepReport::default(), |acc, report| async move {
                acc.merge(report)
            })
            .await;

        info!(
            due = report.due,
            sent = report.sent,
            unrecorded = report.unrecorded,
            failed = report.failed,
            unreachable = report.unreachable,
            skipped = report.skipped,
            "Reminder sweep completed"
        );

        Ok(report)
    }
}

async fn send_user_reminders(
    ctx: &NotifierContext,
    state: &ReminderStateStore<'_>,
    recipient: Option<&Recipient>,
    reminders: Vec<ReminderEvent>,
    now: i64,
) -> SweepReport {
    let mut report = SweepReport {
        due: reminders.len(),
        ..Default::default()
    };
    let recipient = match recipient {
        Some(recipient) if recipient.active => recipient,
        _ => {
            report.skipped = reminders.len();
            return report;
        }
    };

    let total = reminders.len();
    for (i, mut reminder) in reminders.into_iter().enumerate() {
        // The task may have been completed or deleted since it was matched
        match bounded(ctx.config.call_timeout, ctx.repos.tasks.find(&reminder.task.id)).await {
            Ok(Some(task)) if task.is_open() => reminder.task = task,
            Ok(_) => {
                debug!(task_id = %reminder.task.id, "Task is gone or completed, skipping reminder");
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(task_id = %reminder.task.id, "Unable to refetch task. Err: {:?}", e);
                report.failed += 1;
                continue;
            }
        }

        let message = render_reminder(&reminder, now, &ctx.config.reference_timezone);
        match deliver(ctx, recipient, &message).await {
            DeliveryResult::Sent => {
                match state
                    .update_last_reminder_sent(&reminder.task.id, reminder.kind, now)
                    .await
                {
                    Ok(_) => report.sent += 1,
                    Err(e) => {
                        warn!(
                            task_id = %reminder.task.id,
                            kind = %reminder.kind,
                            "Reminder was delivered but could not be recorded, it may be sent again. Err: {:?}",
                            e
                        );
                        report.unrecorded += 1;
                    }
                }
            }
            DeliveryResult::RecipientUnreachable => {
                deactivate_recipient(ctx, &recipient.user_id).await;
                report.unreachable += 1;
                report.skipped += total - i - 1;
                break;
            }
            DeliveryResult::TransientFailure => report.failed += 1,
        }
    }

    report
}
