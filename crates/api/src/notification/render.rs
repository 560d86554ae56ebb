use chrono_tz::Tz;
use deadline_notifier_domain::{
    date::{format_date, format_datetime, format_time},
    DigestSnapshot, Message, MessageControl, ReminderEvent, ReminderKind, Task,
};

const MINUTE: i64 = 1000 * 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Telegram rejects longer messages
const MAX_MESSAGE_CHARS: usize = 4096;
const MAX_TITLE_CHARS: usize = 100;
const MAX_LISTED_TASKS: usize = 15;

/// Human readable rendering of a duration, e.g. `1 h 5 min`
pub fn format_duration(millis: i64) -> String {
    let millis = millis.abs();
    if millis < MINUTE {
        return "less than a minute".into();
    }
    let days = millis / DAY;
    let hours = (millis % DAY) / HOUR;
    let minutes = (millis % HOUR) / MINUTE;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} d", days));
    }
    if hours > 0 {
        parts.push(format!("{} h", hours));
    }
    // Minutes are noise when the deadline is days away
    if minutes > 0 && days == 0 {
        parts.push(format!("{} min", minutes));
    }
    parts.join(" ")
}

fn task_controls(task: &Task) -> Vec<MessageControl> {
    vec![
        MessageControl {
            label: "Mark done".into(),
            callback_data: format!("task:done:{}", task.id),
        },
        MessageControl {
            label: "Snooze".into(),
            callback_data: format!("task:snooze:{}", task.id),
        },
    ]
}

pub fn render_reminder(event: &ReminderEvent, now: i64, tz: &Tz) -> Message {
    let task = &event.task;
    let deadline = task.deadline.unwrap_or(event.scheduled_fire_time);

    let headline = match event.kind {
        ReminderKind::Before => format!(
            "Upcoming deadline: \"{}\" is due in {}.",
            short_title(&task.title),
            format_duration(deadline - now)
        ),
        ReminderKind::AtDeadline if now - deadline < MINUTE => {
            format!("Deadline reached: \"{}\" is due now.", short_title(&task.title))
        }
        ReminderKind::AtDeadline => format!(
            "Deadline reached: \"{}\" was due {} ago.",
            short_title(&task.title),
            format_duration(now - deadline)
        ),
    };

    Message {
        text: format!("{}\nDeadline: {}", headline, format_datetime(deadline, tz)),
        controls: task_controls(task),
    }
}

/// Renders the digest with empty sections left out. Returns `None` when
/// there is nothing to report.
pub fn render_digest(snapshot: &DigestSnapshot, tz: &Tz) -> Option<Message> {
    if snapshot.is_empty() {
        return None;
    }

    let mut sections = vec![format!(
        "Daily summary for {}",
        format_date(snapshot.day_start, tz)
    )];

    if !snapshot.due_today.is_empty() {
        sections.push(format!(
            "Due today ({}):\n{}",
            snapshot.due_today.len(),
            task_lines(&snapshot.due_today, |deadline| format_time(deadline, tz))
        ));
    }

    if !snapshot.overdue.is_empty() {
        sections.push(format!(
            "Overdue ({}):\n{}",
            snapshot.overdue.len(),
            task_lines(&snapshot.overdue, |deadline| format!(
                "due {}",
                format_date(deadline, tz)
            ))
        ));
    }

    if snapshot.completed_yesterday_count > 0 {
        sections.push(format!(
            "Completed yesterday: {}",
            snapshot.completed_yesterday_count
        ));
    }

    Some(Message::text(fit_message(sections.join("\n\n"))))
}

/// One line per task, at most `MAX_LISTED_TASKS` of them
fn task_lines<F>(tasks: &[Task], describe_deadline: F) -> String
where
    F: Fn(i64) -> String,
{
    let mut lines = tasks
        .iter()
        .take(MAX_LISTED_TASKS)
        .map(|t| match t.deadline {
            Some(deadline) => format!(
                "- {} ({})",
                short_title(&t.title),
                describe_deadline(deadline)
            ),
            None => format!("- {}", short_title(&t.title)),
        })
        .collect::<Vec<_>>();
    if tasks.len() > MAX_LISTED_TASKS {
        lines.push(format!("- and {} more", tasks.len() - MAX_LISTED_TASKS));
    }
    lines.join("\n")
}

fn short_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut short = title.chars().take(MAX_TITLE_CHARS - 3).collect::<String>();
    short.push_str("...");
    short
}

fn fit_message(text: String) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text;
    }
    let mut fitted = text.chars().take(MAX_MESSAGE_CHARS - 3).collect::<String>();
    fitted.push_str("...");
    fitted
}
