use crate::{
    digest::send_daily_digests::SendDailyDigestsUseCase,
    reminder::send_due_reminders::SendDueRemindersUseCase, shared::usecase::execute,
};
use chrono::NaiveTime;
use chrono_tz::Tz;
use deadline_notifier_domain::date::next_daily_fire_time;
use deadline_notifier_infra::{ISys, NotifierContext};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{error, info, warn};

pub const REMINDER_SWEEP_JOB: &str = "reminder_sweep";
pub const DAILY_DIGEST_JOB: &str = "daily_digest";

type JobResult = Result<(), String>;

/// Run bookkeeping of a single job. At most one run of a job is in progress
/// at any time.
#[derive(Debug)]
pub struct JobMonitor {
    name: &'static str,
    running: AtomicBool,
    completed_runs: AtomicU64,
    failed_runs: AtomicU64,
    skipped_ticks: AtomicU64,
}

impl JobMonitor {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            running: AtomicBool::new(false),
            completed_runs: AtomicU64::new(0),
            failed_runs: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs.load(Ordering::Relaxed)
    }

    pub fn failed_runs(&self) -> u64 {
        self.failed_runs.load(Ordering::Relaxed)
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks.load(Ordering::Relaxed)
    }

    /// Returns `None` when a run is already in progress
    pub fn try_start(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                monitor: self.clone(),
            })
    }

    fn skip_tick(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
        warn!(
            job = self.name,
            "Previous run is still in progress, skipping this tick"
        );
    }
}

/// Marks the job as running until dropped
pub struct RunGuard {
    monitor: Arc<JobMonitor>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.monitor.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct JobMonitors {
    pub reminder_sweep: Arc<JobMonitor>,
    pub daily_digest: Arc<JobMonitor>,
}

impl JobMonitors {
    pub fn new() -> Self {
        Self {
            reminder_sweep: JobMonitor::new(REMINDER_SWEEP_JOB),
            daily_digest: JobMonitor::new(DAILY_DIGEST_JOB),
        }
    }

    pub fn all(&self) -> Vec<Arc<JobMonitor>> {
        vec![self.reminder_sweep.clone(), self.daily_digest.clone()]
    }
}

impl Default for JobMonitors {
    fn default() -> Self {
        Self::new()
    }
}

/// Millis until the wall clock reaches the next multiple of `period_millis`
pub fn get_start_delay(now_ts: i64, period_millis: i64) -> i64 {
    if period_millis <= 0 {
        return 0;
    }
    let into_period = now_ts.rem_euclid(period_millis);
    if into_period == 0 {
        0
    } else {
        period_millis - into_period
    }
}

/// Executes one run in its own task. A failing or panicking run is logged
/// and counted, the scheduler keeps going.
async fn run_guarded<Fut>(guard: RunGuard, job: Fut)
where
    Fut: Future<Output = JobResult> + Send + 'static,
{
    let monitor = &guard.monitor;
    match tokio::spawn(job).await {
        Ok(Ok(())) => {
            monitor.completed_runs.fetch_add(1, Ordering::Relaxed);
        }
        Ok(Err(e)) => {
            monitor.failed_runs.fetch_add(1, Ordering::Relaxed);
            error!(job = monitor.name, "Job run failed: {}", e);
        }
        Err(e) => {
            monitor.failed_runs.fetch_add(1, Ordering::Relaxed);
            error!(job = monitor.name, "Job run panicked: {}", e);
        }
    }
}

fn fire<F, Fut>(monitor: &Arc<JobMonitor>, job: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = JobResult> + Send + 'static,
{
    match monitor.try_start() {
        Some(guard) => {
            tokio::spawn(run_guarded(guard, job()));
        }
        None => monitor.skip_tick(),
    }
}

/// Fires `job` at `start` and every `period` after that
pub fn spawn_interval_job<F, Fut>(
    monitor: Arc<JobMonitor>,
    start: Instant,
    period: Duration,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = JobResult> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            fire(&monitor, &job);
        }
    })
}

/// Fires `job` every day at the wall clock `time` in `tz`. Occurrences that
/// passed while the process was not running are not made up for.
pub fn spawn_daily_job<F, Fut>(
    monitor: Arc<JobMonitor>,
    sys: Arc<dyn ISys>,
    time: NaiveTime,
    tz: Tz,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = JobResult> + Send + 'static,
{
    const RETRY_DELAY: Duration = Duration::from_secs(60 * 60);

    tokio::spawn(async move {
        let mut after = sys.get_timestamp_millis();
        loop {
            let fire_at = match next_daily_fire_time(after, time, &tz) {
                Some(fire_at) => fire_at,
                None => {
                    error!(
                        job = monitor.name,
                        "Unable to compute the next fire time after {}", after
                    );
                    sleep(RETRY_DELAY).await;
                    after = sys.get_timestamp_millis();
                    continue;
                }
            };
            info!(job = monitor.name, "Next run scheduled at {}", fire_at);

            let now = sys.get_timestamp_millis();
            if fire_at > now {
                sleep(Duration::from_millis((fire_at - now) as u64)).await;
            }
            after = fire_at;
            fire(&monitor, &job);
        }
    })
}

pub fn start_reminder_sweep_job(ctx: NotifierContext, monitor: Arc<JobMonitor>) -> JoinHandle<()> {
    let period = ctx.config.sweep_interval;
    let delay = get_start_delay(ctx.sys.get_timestamp_millis(), period.as_millis() as i64);
    let start = Instant::now() + Duration::from_millis(delay as u64);

    spawn_interval_job(monitor, start, period, move || {
        let ctx = ctx.clone();
        async move {
            execute(SendDueRemindersUseCase, &ctx)
                .await
                .map(|_| ())
                .map_err(|e| format!("{:?}", e))
        }
    })
}

pub fn start_daily_digest_job(ctx: NotifierContext, monitor: Arc<JobMonitor>) -> JoinHandle<()> {
    let sys = ctx.sys.clone();
    let time = ctx.config.digest_time;
    let tz = ctx.config.reference_timezone;

    spawn_daily_job(monitor, sys, time, tz, move || {
        let ctx = ctx.clone();
        async move {
            execute(SendDailyDigestsUseCase, &ctx)
                .await
                .map(|_| ())
                .map_err(|e| format!("{:?}", e))
        }
    })
}
