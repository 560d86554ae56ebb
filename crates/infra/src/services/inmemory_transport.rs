use super::{ITransport, SendOutcome};
use deadline_notifier_domain::Message;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: String,
    pub message: Message,
}

/// Transport that keeps delivered messages in memory. Outcomes and latency
/// can be scripted per chat to exercise failure handling.
#[derive(Default)]
pub struct InMemoryTransport {
    sent: Mutex<Vec<SentMessage>>,
    outcomes: Mutex<HashMap<String, SendOutcome>>,
    delays: Mutex<HashMap<String, Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_outcome(&self, chat_id: &str, outcome: SendOutcome) {
        lock(&self.outcomes).insert(chat_id.to_string(), outcome);
    }

    pub fn set_delay(&self, chat_id: &str, delay: Duration) {
        lock(&self.delays).insert(chat_id.to_string(), delay);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_to(&self, chat_id: &str) -> Vec<Message> {
        lock(&self.sent)
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.message.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ITransport for InMemoryTransport {
    async fn send_message(&self, chat_id: &str, message: &Message) -> SendOutcome {
        let delay = lock(&self.delays).get(chat_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = lock(&self.outcomes)
            .get(chat_id)
            .cloned()
            .unwrap_or(SendOutcome::Delivered);
        if outcome == SendOutcome::Delivered {
            lock(&self.sent).push(SentMessage {
                chat_id: chat_id.to_string(),
                message: message.clone(),
            });
        }
        outcome
    }
}
