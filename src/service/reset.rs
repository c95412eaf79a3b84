use chrono::{NaiveTime, Weekday};
use dashmap::DashMap;
use derive_new::new;
use tokio::select;
use tracing::instrument;

use crate::database::{counters, Database};
use crate::model::{now, ResetKind};
use crate::window;

/// Zeroes the windowed counter for `kind` across all records in one
/// batched write. A failure is logged and absorbed: the stale counters
/// simply persist until the next firing, one full cadence later.
#[instrument(skip(db))]
pub async fn run_reset(kind: ResetKind, db: &Database) {
    match counters::reset_all(kind, db).await {
        Ok(()) => tracing::info!(%kind, "zeroed windowed counters"),
        Err(err) => {
            tracing::error!(%kind, error = %err, "batch reset failed, counters stay stale until the next firing")
        }
    }
}

/// When each reset kind fires, in the process-wide timezone.
#[derive(Debug, Clone, new)]
pub struct ResetSchedule {
    pub daily_at: NaiveTime,
    pub weekly_on: Weekday,
    pub weekly_at: NaiveTime,
}

/// Owns one background task per reset kind. The two tasks run on
/// independent timers and never coordinate with each other or with the
/// view path; they share nothing but the record store.
pub struct ResetScheduler {
    jobs: DashMap<ResetKind, Job>,
    database: Database,
    schedule: ResetSchedule,
}

impl ResetScheduler {
    pub fn new(database: Database, schedule: ResetSchedule) -> Self {
        Self {
            jobs: DashMap::new(),
            database,
            schedule,
        }
    }

    pub fn start(&self) {
        self.spawn(ResetKind::Daily);
        self.spawn(ResetKind::Weekly);
    }

    #[instrument(skip(self))]
    fn spawn(&self, kind: ResetKind) {
        let (stop, mut signal) = tokio::sync::oneshot::channel();
        let database = self.database.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            let mut timer = match kind {
                ResetKind::Daily => window::daily_timer(schedule.daily_at, now()),
                ResetKind::Weekly => {
                    window::weekly_timer(schedule.weekly_on, schedule.weekly_at, now())
                }
            };
            tracing::info!(%kind, period = ?timer.period(), "reset job scheduled");

            loop {
                select! {
                    _ = &mut signal => {
                        tracing::info!(%kind, "reset job stopped");
                        break;
                    }

                    _ = timer.tick() => {
                        run_reset(kind, &database).await;
                    }
                }
            }
        });

        if let Some(previous) = self.jobs.insert(kind, Job::new(handle, stop)) {
            previous.stop();
        }
    }

    pub fn stop_all(&self) {
        let kinds: Vec<ResetKind> = self.jobs.iter().map(|job| *job.key()).collect();

        for kind in kinds {
            if let Some((_, job)) = self.jobs.remove(&kind) {
                job.stop();
            }
        }
    }
}

#[derive(Debug, new)]
struct Job {
    _handle: tokio::task::JoinHandle<()>,
    stop: tokio::sync::oneshot::Sender<()>,
}

impl Job {
    fn stop(self) {
        self.stop.send(()).ok();
    }
}
