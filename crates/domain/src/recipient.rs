use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// Links a `User` to the chat that notifications are delivered to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: ID,
    pub chat_id: String,
    /// Set to false when the transport reports the chat as unreachable,
    /// e.g. the user blocked the bot.
    pub active: bool,
}

impl Recipient {
    pub fn new(user_id: ID, chat_id: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id: chat_id.into(),
            active: true,
        }
    }
}

impl Entity for Recipient {
    fn id(&self) -> &ID {
        &self.user_id
    }
}
