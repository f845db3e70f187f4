use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::constants::metric;
use crate::services::AccountService;

/// Drives the unactivated account cleanup on a cron expression or a fixed
/// interval.
pub struct Scheduler {
    accounts: Arc<dyn AccountService>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
    cron: Mutex<Option<JobScheduler>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(accounts: Arc<dyn AccountService>, config: SchedulerConfig) -> Self {
        Self {
            accounts,
            config,
            running: Arc::new(RwLock::new(false)),
            cron: Mutex::new(None),
            ticker: Mutex::new(None),
        }
    }

    /// Registers the cleanup job and returns once it is scheduled. The job
    /// keeps running in the background until [`Scheduler::stop`].
    ///
    /// # Errors
    ///
    /// Fails if the cron expression is rejected or the job scheduler cannot
    /// start.
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cleanup_cron {
            if let Err(e) = self.start_cron(cron_expr).await {
                *self.running.write().await = false;
                return Err(e);
            }
        } else {
            self.start_interval().await;
        }

        Ok(())
    }

    async fn start_cron(&self, cron_expr: &str) -> Result<()> {
        let sched = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        let accounts = Arc::clone(&self.accounts);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let accounts = Arc::clone(&accounts);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_cleanup(accounts.as_ref()).await;
            })
        })
        .with_context(|| format!("Invalid cleanup cron expression: {cron_expr}"))?;

        sched.add(job).await?;
        sched.start().await?;
        *self.cron.lock().await = Some(sched);

        info!("Account cleanup scheduled with cron: {}", cron_expr);
        Ok(())
    }

    async fn start_interval(&self) {
        let interval_hours = self.config.cleanup_interval_hours.max(1);
        info!("Account cleanup running every {}h", interval_hours);

        let accounts = Arc::clone(&self.accounts);
        let running = Arc::clone(&self.running);
        let period = Duration::from_secs(u64::from(interval_hours) * 60 * 60);

        let handle = tokio::spawn(async move {
            let mut cleanup_interval = interval(period);
            loop {
                cleanup_interval.tick().await;
                if !*running.read().await {
                    break;
                }
                run_cleanup(accounts.as_ref()).await;
            }
        });
        *self.ticker.lock().await = Some(handle);
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;

        if let Some(mut sched) = self.cron.lock().await.take()
            && let Err(e) = sched.shutdown().await
        {
            warn!("Job scheduler shutdown failed: {}", e);
        }

        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Run the cleanup once, outside any schedule.
    pub async fn run_once(&self) -> Result<u64> {
        info!("Running manual account cleanup...");
        let removed = self.accounts.remove_not_activated_users().await?;
        info!("Removed {} not activated account(s)", removed);
        Ok(removed)
    }
}

async fn run_cleanup(accounts: &dyn AccountService) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "remove_not_activated_users", "Starting account cleanup");

    match accounts.remove_not_activated_users().await {
        Ok(removed) => {
            metrics::counter!(metric::CLEANUP_RUNS, "outcome" => "success").increment(1);
            info!(
                event = "job_finished",
                job_name = "remove_not_activated_users",
                removed = removed,
                duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "Account cleanup finished"
            );
        }
        Err(e) => {
            metrics::counter!(metric::CLEANUP_RUNS, "outcome" => "failure").increment(1);
            error!(
                event = "job_failed",
                job_name = "remove_not_activated_users",
                error = %e,
                "Account cleanup failed"
            );
        }
    }
}
