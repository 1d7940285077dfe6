use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::server::{
    model::outcome::TriggerSource,
    service::sync::{SyncCoordinator, TriggerOutcome},
};

/// Initialize and start the cron job scheduler
///
/// Registers a single job that triggers a scheduled sync run on every tick of `cron`. A tick
/// that fires while a run is still in flight queues one follow-up run in the coordinator.
///
/// # Arguments
/// - `cron` - Six field cron expression (with seconds), e.g. `0 */5 * * * *`
/// - `coordinator` - Coordinator that executes the runs
///
/// # Returns
/// - `Ok(JobScheduler)` - The running scheduler, keep it alive for jobs to fire
/// - `Err(JobSchedulerError)` - The expression is invalid or the scheduler failed to start
pub async fn start_scheduler(
    cron: &str,
    coordinator: &SyncCoordinator,
) -> Result<JobScheduler, JobSchedulerError> {
    let sched = JobScheduler::new().await?;
    let coordinator_clone = coordinator.clone();

    sched
        .add(Job::new_async(cron, move |_, _| {
            let coordinator = coordinator_clone.clone();

            Box::pin(async move {
                match coordinator.trigger(TriggerSource::Schedule).await {
                    Ok(TriggerOutcome::Running(handle)) => {
                        tracing::info!("Scheduled sync run {} started", handle.run_id)
                    }
                    Ok(TriggerOutcome::Queued { in_flight }) => {
                        tracing::info!("Scheduled sync queued behind run {}", in_flight)
                    }
                    Ok(TriggerOutcome::Dropped { in_flight }) => {
                        tracing::debug!("Scheduled sync dropped, run {} has a follow-up queued", in_flight)
                    }
                    Err(e) => tracing::error!("Error starting scheduled sync run: {}", e),
                }
            })
        })?)
        .await?;

    sched.start().await?;

    tracing::info!("Sync scheduler started with cron expression {:?}", cron);

    Ok(sched)
}
