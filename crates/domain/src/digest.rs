use crate::{shared::entity::ID, task::Task};

/// A summary of the workload of a `User`, computed fresh on every digest run
#[derive(Debug, Clone, PartialEq)]
pub struct DigestSnapshot {
    pub user_id: ID,
    /// Start of the calendar day the digest was built for, in millis
    pub day_start: i64,
    /// Open `Task`s with a deadline during the current calendar day
    pub due_today: Vec<Task>,
    /// Open `Task`s with a deadline before the current calendar day
    pub overdue: Vec<Task>,
    /// Number of `Task`s completed during the previous calendar day
    pub completed_yesterday_count: i64,
}

impl DigestSnapshot {
    pub fn is_empty(&self) -> bool {
        self.due_today.is_empty() && self.overdue.is_empty() && self.completed_yesterday_count == 0
    }
}
