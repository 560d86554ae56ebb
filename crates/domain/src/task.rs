use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(status: &str) -> Self {
        match status {
            "open" => Self::Open,
            // Anything the store reports that is not open is never eligible for reminders
            _ => Self::Done,
        }
    }
}

/// A `Task` is owned by the external task store. This service only reads the
/// fields needed to decide whether a reminder is owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: ID,
    /// The `User` that should be reminded about this `Task`
    pub owner_id: ID,
    pub title: String,
    /// Deadline timestamp in millis. Tasks without a deadline never get reminders.
    pub deadline: Option<i64>,
    pub status: TaskStatus,
    /// Timestamp in millis at which the `Task` transitioned to `TaskStatus::Done`
    pub completed_at: Option<i64>,
}

impl Task {
    pub fn new(owner_id: ID, title: impl Into<String>, deadline: Option<i64>) -> Self {
        Self {
            id: Default::default(),
            owner_id,
            title: title.into(),
            deadline,
            status: TaskStatus::Open,
            completed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn complete(&mut self, at: i64) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(at);
    }
}

impl Entity for Task {
    fn id(&self) -> &ID {
        &self.id
    }
}
