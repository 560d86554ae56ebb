use serde::{Deserialize, Serialize};

/// A user actionable choice attached to a `Message`, e.g. mark done or snooze.
/// The callback produced when the user picks it is handled outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageControl {
    pub label: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub controls: Vec<MessageControl>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            controls: Vec::new(),
        }
    }
}
