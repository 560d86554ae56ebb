use crate::shared::timeout::bounded;
use deadline_notifier_domain::{Message, Recipient, ID};
use deadline_notifier_infra::{NotifierContext, SendOutcome};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    Sent,
    /// The recipient blocked or deleted the conversation. The caller should
    /// stop sending to this recipient.
    RecipientUnreachable,
    /// Transport error or timeout. Nothing is retried within the same run.
    TransientFailure,
}

/// Delivers a single message. Never retries, a failed delivery is left for
/// the next run of the job to pick up.
pub async fn deliver(
    ctx: &NotifierContext,
    recipient: &Recipient,
    message: &Message,
) -> DeliveryResult {
    let send = ctx.transport.send_message(&recipient.chat_id, message);
    match tokio::time::timeout(ctx.config.call_timeout, send).await {
        Ok(SendOutcome::Delivered) => DeliveryResult::Sent,
        Ok(SendOutcome::RecipientUnreachable(reason)) => {
            info!(
                user_id = %recipient.user_id,
                "Recipient is unreachable: {}", reason
            );
            DeliveryResult::RecipientUnreachable
        }
        Ok(SendOutcome::Failed(reason)) => {
            warn!(
                user_id = %recipient.user_id,
                "Unable to deliver notification: {}", reason
            );
            DeliveryResult::TransientFailure
        }
        Err(_) => {
            warn!(
                user_id = %recipient.user_id,
                "Delivering notification timed out after {:?}", ctx.config.call_timeout
            );
            DeliveryResult::TransientFailure
        }
    }
}

/// Marks the recipient as inactive so that future runs skip it
pub async fn deactivate_recipient(ctx: &NotifierContext, user_id: &ID) {
    match bounded(
        ctx.config.call_timeout,
        ctx.repos.recipients.set_active(user_id, false),
    )
    .await
    {
        Ok(_) => info!(user_id = %user_id, "Recipient marked as inactive"),
        Err(e) => error!(
            user_id = %user_id,
            "Unable to mark recipient as inactive. Err: {:?}", e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadline_notifier_infra::InMemoryTransport;
    use std::{sync::Arc, time::Duration};

    fn setup() -> (NotifierContext, Arc<InMemoryTransport>) {
        let mut ctx = NotifierContext::create_inmemory();
        let transport = Arc::new(InMemoryTransport::new());
        ctx.transport = transport.clone();
        ctx.config.call_timeout = Duration::from_millis(50);
        (ctx, transport)
    }

    #[tokio::test]
    async fn it_classifies_delivery_outcomes() {
        let (ctx, transport) = setup();
        let message = Message::text("Hello");

        let ok = Recipient::new(ID::default(), "ok");
        assert_eq!(deliver(&ctx, &ok, &message).await, DeliveryResult::Sent);
        assert_eq!(transport.sent_to("ok"), vec![message.clone()]);

        let blocked = Recipient::new(ID::default(), "blocked");
        transport.set_outcome("blocked", SendOutcome::RecipientUnreachable("blocked".into()));
        assert_eq!(
            deliver(&ctx, &blocked, &message).await,
            DeliveryResult::RecipientUnreachable
        );

        let flaky = Recipient::new(ID::default(), "flaky");
        transport.set_outcome("flaky", SendOutcome::Failed("502".into()));
        assert_eq!(
            deliver(&ctx, &flaky, &message).await,
            DeliveryResult::TransientFailure
        );
    }

    #[tokio::test]
    async fn timeouts_are_transient_failures() {
        let (ctx, transport) = setup();
        let slow = Recipient::new(ID::default(), "slow");
        transport.set_delay("slow", Duration::from_millis(500));
        assert_eq!(
            deliver(&ctx, &slow, &Message::text("Hello")).await,
            DeliveryResult::TransientFailure
        );
        assert!(transport.sent_to("slow").is_empty());
    }

    #[tokio::test]
    async fn it_deactivates_recipients() {
        let (ctx, _) = setup();
        let recipient = Recipient::new(ID::default(), "blocked");
        ctx.repos.recipients.save(&recipient).await.unwrap();

        deactivate_recipient(&ctx, &recipient.user_id).await;

        let stored = ctx
            .repos
            .recipients
            .find_many(&[recipient.user_id])
            .await
            .unwrap();
        assert!(!stored[0].active);
    }
}
