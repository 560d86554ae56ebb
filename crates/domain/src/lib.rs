pub mod date;
mod digest;
mod message;
mod recipient;
mod reminder;
mod settings;
mod shared;
mod task;

pub use digest::DigestSnapshot;
pub use message::{Message, MessageControl};
pub use recipient::Recipient;
pub use reminder::{owed_reminder, ReminderEvent, ReminderKind, ReminderLedgerEntry, ReminderLog};
pub use settings::{
    default_daily_summary_time, UserReminderSettings, UserReminderSettingsPatch,
    DEFAULT_REMINDER_MINUTES_BEFORE, MAX_REMINDER_MINUTES_BEFORE,
};
pub use shared::entity::{Entity, ID};
pub use task::{Task, TaskStatus};
