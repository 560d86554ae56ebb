mod inmemory;
mod postgres;

use deadline_notifier_domain::{Recipient, ID};
pub use inmemory::InMemoryRecipientRepo;
pub use postgres::PostgresRecipientRepo;

#[async_trait::async_trait]
pub trait IRecipientRepo: Send + Sync {
    /// Links the `User` to a chat, replacing any earlier link
    async fn save(&self, recipient: &Recipient) -> anyhow::Result<()>;
    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Recipient>>;
    async fn set_active(&self, user_id: &ID, active: bool) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotifierContext;

    #[tokio::test]
    async fn it_deactivates_recipients() {
        let ctx = NotifierContext::create_inmemory();
        let recipient = Recipient::new(ID::default(), "1234");
        let other = Recipient::new(ID::default(), "5678");
        ctx.repos.recipients.save(&recipient).await.expect("To save");
        ctx.repos.recipients.save(&other).await.expect("To save");

        ctx.repos
            .recipients
            .set_active(&recipient.user_id, false)
            .await
            .expect("To deactivate");

        let mut found = ctx
            .repos
            .recipients
            .find_many(&[recipient.user_id, other.user_id])
            .await
            .expect("To find");
        found.sort_by_key(|r| r.chat_id.clone());
        assert_eq!(found.len(), 2);
        assert!(!found[0].active);
        assert!(found[1].active);
    }
}
