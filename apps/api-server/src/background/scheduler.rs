//! Thin wrapper over tokio-cron-scheduler that remembers what it registered.

use std::future::Future;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

/// Every minute, at second zero.
pub const EVERY_MINUTE: &str = "0 * * * * *";

/// Which maintenance jobs run and how often (six-field cron expressions).
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub cache_purge: String,
    pub limiter_shrink: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_purge: EVERY_MINUTE.to_string(),
            limiter_shrink: EVERY_MINUTE.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| flag_enabled(&v))
                .unwrap_or(defaults.enabled),
            cache_purge: std::env::var("CACHE_PURGE_CRON").unwrap_or(defaults.cache_purge),
            limiter_shrink: std::env::var("RATE_LIMIT_SHRINK_CRON")
                .unwrap_or(defaults.limiter_shrink),
        }
    }
}

fn flag_enabled(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off" | "no")
}

pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
    jobs: Vec<(&'static str, Uuid)>,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self {
            inner,
            config,
            jobs: Vec::new(),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Names of the registered jobs, in registration order.
    pub fn job_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.jobs.iter().map(|(name, _)| *name)
    }

    /// Register a named job. The task runs on the scheduler's tokio runtime.
    pub async fn add_cron<F, Fut>(
        &mut self,
        name: &'static str,
        schedule: &str,
        task: F,
    ) -> Result<Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        self.jobs.push((name, id));
        tracing::info!(job = name, schedule = %schedule, job_id = %id, "Maintenance job registered");
        Ok(id)
    }

    /// Start ticking. A disabled scheduler keeps its jobs but never runs them.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!(jobs = self.jobs.len(), "Maintenance jobs disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!(jobs = self.jobs.len(), "Maintenance jobs started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        if self.config.enabled {
            self.inner.shutdown().await?;
        }
        tracing::info!("Maintenance jobs stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert!(flag_enabled("true"));
        assert!(flag_enabled("1"));
        assert!(!flag_enabled("false"));
        assert!(!flag_enabled(" OFF "));
        assert!(!flag_enabled("0"));
    }

    #[tokio::test]
    async fn test_jobs_are_remembered_by_name() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default()).await.unwrap();
        scheduler
            .add_cron("noop", EVERY_MINUTE, || async {})
            .await
            .unwrap();

        assert_eq!(scheduler.job_names().collect::<Vec<_>>(), vec!["noop"]);
    }

    #[tokio::test]
    async fn test_bad_cron_expression_is_rejected() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default()).await.unwrap();
        let result = scheduler.add_cron("bad", "every minute", || async {}).await;

        assert!(result.is_err());
        assert_eq!(scheduler.job_names().count(), 0);
    }
}
