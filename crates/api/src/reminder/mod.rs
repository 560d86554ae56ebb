pub mod find_due_reminders;
pub mod send_due_reminders;
