use chrono::NaiveTime;
use chrono_tz::Tz;
use deadline_notifier_domain::{default_daily_summary_time, DEFAULT_REMINDER_MINUTES_BEFORE};
use rand::{distributions::Alphanumeric, Rng};
use std::{str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret that internal clients must provide in the `x-api-key` header
    pub api_secret_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// How often the reminder sweep job runs
    pub sweep_interval: Duration,
    /// How long after a deadline an `at_deadline` reminder is still sent.
    /// Keeps arbitrarily old overdue tasks from being reminded about on every sweep.
    pub reminder_grace: Duration,
    /// Wall clock time at which the daily digest job fires
    pub digest_time: NaiveTime,
    /// Timezone used for the digest fire time and for calendar days
    pub reference_timezone: Tz,
    /// Lead time used when reminder settings are created for a user
    pub default_reminder_minutes_before: u32,
    /// Summary time used when reminder settings are created for a user
    pub default_daily_summary_time: NaiveTime,
    /// Page size when fetching tasks that need a reminder check
    pub reminder_batch_size: usize,
    /// Maximum number of recipients being delivered to at the same time
    pub delivery_concurrency: usize,
    /// Upper bound for every data store and transport call
    pub call_timeout: Duration,
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T
where
    T: std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {:?}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_time_env(key: &str, default: NaiveTime) -> NaiveTime {
    match std::env::var(key) {
        Ok(value) => match NaiveTime::parse_from_str(&value, "%H:%M") {
            Ok(time) => time,
            Err(_) => {
                warn!(
                    "The given {}: {} is not a valid HH:MM time, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn create_random_secret(secret_len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}

impl Config {
    pub fn new() -> Self {
        let api_secret_key = match std::env::var("API_SECRET_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find API_SECRET_KEY environment variable. Going to create one.");
                let key = create_random_secret(32);
                info!("Secret api key was generated and set to: {}", key);
                key
            }
        };

        let sweep_interval_secs = parse_env("SWEEP_INTERVAL_SECS", 5 * 60_u64).max(1);
        let reminder_grace_secs = parse_env(
            "REMINDER_GRACE_SECS",
            default_reminder_grace(Duration::from_secs(sweep_interval_secs)).as_secs(),
        );
        let reference_timezone = match std::env::var("REFERENCE_TIMEZONE") {
            Ok(tz) => tz.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    "The given REFERENCE_TIMEZONE: {} is not valid, falling back to UTC.",
                    tz
                );
                chrono_tz::UTC
            }),
            Err(_) => chrono_tz::UTC,
        };

        Self {
            api_secret_key,
            port: parse_env("PORT", 5000),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            reminder_grace: Duration::from_secs(reminder_grace_secs),
            digest_time: parse_time_env("DIGEST_TIME", default_daily_summary_time()),
            reference_timezone,
            default_reminder_minutes_before: parse_env(
                "DEFAULT_REMINDER_MINUTES_BEFORE",
                DEFAULT_REMINDER_MINUTES_BEFORE,
            ),
            default_daily_summary_time: parse_time_env(
                "DEFAULT_DAILY_SUMMARY_TIME",
                default_daily_summary_time(),
            ),
            reminder_batch_size: parse_env("REMINDER_BATCH_SIZE", 100_usize).max(1),
            delivery_concurrency: parse_env("DELIVERY_CONCURRENCY", 8_usize).max(1),
            call_timeout: Duration::from_secs(parse_env("CALL_TIMEOUT_SECS", 10)),
        }
    }

    pub fn reminder_grace_millis(&self) -> i64 {
        self.reminder_grace.as_millis() as i64
    }
}

/// Two sweep intervals, so a deadline falls inside the at deadline window of
/// at least one run even when runs start late
pub fn default_reminder_grace(sweep_interval: Duration) -> Duration {
    sweep_interval * 2
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
