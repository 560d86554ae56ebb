use super::IRecipientRepo;
use crate::repos::shared::inmemory_repo::*;
use deadline_notifier_domain::{Recipient, ID};

pub struct InMemoryRecipientRepo {
    recipients: std::sync::Mutex<Vec<Recipient>>,
}

impl InMemoryRecipientRepo {
    pub fn new() -> Self {
        Self {
            recipients: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IRecipientRepo for InMemoryRecipientRepo {
    async fn save(&self, recipient: &Recipient) -> anyhow::Result<()> {
        save(recipient, &self.recipients);
        Ok(())
    }

    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Recipient>> {
        Ok(find_by(&self.recipients, |r| user_ids.contains(&r.user_id)))
    }

    async fn set_active(&self, user_id: &ID, active: bool) -> anyhow::Result<()> {
        update_many(
            &self.recipients,
            |r| r.user_id == *user_id,
            |r| r.active = active,
        );
        Ok(())
    }
}
