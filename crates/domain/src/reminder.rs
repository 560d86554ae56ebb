use crate::{
    settings::UserReminderSettings,
    shared::entity::ID,
    task::Task,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent `reminder_minutes_before` the deadline
    Before,
    /// Sent when the deadline is reached
    AtDeadline,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::AtDeadline => "at_deadline",
        }
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Self::Before),
            "at_deadline" => Ok(Self::AtDeadline),
            other => Err(format!("Unknown reminder kind: {}", other)),
        }
    }
}

/// A row in the idempotency ledger. There is at most one entry per
/// `(task_id, kind)` and `sent_at` never moves backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderLedgerEntry {
    pub task_id: ID,
    pub kind: ReminderKind,
    pub sent_at: i64,
}

/// The reminders already recorded as sent for a single `Task`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderLog {
    pub before_sent_at: Option<i64>,
    pub at_deadline_sent_at: Option<i64>,
}

impl ReminderLog {
    pub fn record(&mut self, kind: ReminderKind, sent_at: i64) {
        let slot = match kind {
            ReminderKind::Before => &mut self.before_sent_at,
            ReminderKind::AtDeadline => &mut self.at_deadline_sent_at,
        };
        *slot = Some(slot.map_or(sent_at, |prev| prev.max(sent_at)));
    }

    pub fn is_sent(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::Before => self.before_sent_at.is_some(),
            ReminderKind::AtDeadline => self.at_deadline_sent_at.is_some(),
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ReminderLedgerEntry>) -> Self {
        let mut log = Self::default();
        for entry in entries {
            log.record(entry.kind, entry.sent_at);
        }
        log
    }
}

/// A reminder that is owed right now. It is computed fresh on every sweep
/// and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEvent {
    pub task: Task,
    pub kind: ReminderKind,
    /// The timestamp at which the reminder became owed
    pub scheduled_fire_time: i64,
}

impl ReminderEvent {
    pub fn user_id(&self) -> &ID {
        &self.task.owner_id
    }
}

/// Decides which reminder, if any, is owed for `task` at `now`.
///
/// The `before` window is `[deadline - lead, deadline)` and the `at_deadline`
/// window is `[deadline, deadline + grace)`. The windows are disjoint so at
/// most one reminder is returned. A kind that has been recorded as sent is
/// never owed again, also when the deadline has been edited afterwards.
pub fn owed_reminder(
    task: &Task,
    settings: &UserReminderSettings,
    log: &ReminderLog,
    now: i64,
    grace_millis: i64,
) -> Option<ReminderEvent> {
    if !task.is_open() || !settings.reminders_enabled {
        return None;
    }
    let deadline = task.deadline?;

    let before_fire_time = deadline - settings.reminder_lead_millis();
    if before_fire_time <= now && now < deadline && !log.is_sent(ReminderKind::Before) {
        return Some(ReminderEvent {
            task: task.clone(),
            kind: ReminderKind::Before,
            scheduled_fire_time: before_fire_time,
        });
    }

    if deadline <= now && now < deadline + grace_millis && !log.is_sent(ReminderKind::AtDeadline)
    {
        return Some(ReminderEvent {
            task: task.clone(),
            kind: ReminderKind::AtDeadline,
            scheduled_fire_time: deadline,
        });
    }

    None
}
