mod inmemory_transport;
mod telegram;

use deadline_notifier_domain::Message;
pub use inmemory_transport::{InMemoryTransport, SentMessage};
pub use telegram::TelegramTransport;

/// What the chat transport reported for a single message
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Delivered,
    /// The chat is gone or the user blocked the bot. Retrying will not help.
    RecipientUnreachable(String),
    /// Network or transport error. A later attempt might succeed.
    Failed(String),
}

/// The channel notifications are delivered through
#[async_trait::async_trait]
pub trait ITransport: Send + Sync {
    async fn send_message(&self, chat_id: &str, message: &Message) -> SendOutcome;
}
