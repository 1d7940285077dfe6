//! Sync run coordinator.
//!
//! Runs are serialized by a single global run slot. A manual trigger that arrives while a run is
//! in flight joins that run, a scheduled trigger queues at most one follow-up run. Within a run,
//! entities are synced as independent tokio tasks behind a semaphore, each with its own timeout,
//! so a slow or failing entity never holds up or aborts its siblings.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::{
    sync::{broadcast, watch, Mutex, Semaphore},
    task::JoinHandle,
};

use crate::server::{
    data::{entity::BusinessEntityRepository, sync_run::SyncRunRepository},
    error::{sync::SyncError, Error},
    model::outcome::{EntityReport, RunStatus, SyncAlert, SyncRunSummary, TriggerSource},
    service::{
        cache::BalanceCache,
        sync::{worker::EntitySyncWorker, SyncContext},
    },
    util::time::cycle_start,
};

const ALERT_CHANNEL_CAPACITY: usize = 16;

/// Handle to a run that was started or joined.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub run_id: i32,
    /// The trigger joined a run that was already in flight
    pub coalesced: bool,
    done: watch::Receiver<Option<SyncRunSummary>>,
}

impl RunHandle {
    /// Waits for the run to finish.
    ///
    /// # Returns
    /// - `Ok(SyncRunSummary)` - The finalized run
    /// - `Err(Error::InternalError)` - The run driver stopped without reporting a result
    pub async fn wait(mut self) -> Result<SyncRunSummary, Error> {
        let run_id = self.run_id;
        let missing = || Error::InternalError(format!("sync run {run_id} ended without a result"));

        let summary = self
            .done
            .wait_for(Option::is_some)
            .await
            .map_err(|_| missing())?
            .clone();

        summary.ok_or_else(missing)
    }
}

/// What happened to a trigger.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A new run was started, or the in-flight run was joined
    Running(RunHandle),
    /// A follow-up run was queued behind the in-flight run
    Queued { in_flight: i32 },
    /// A follow-up run is already queued, the trigger was dropped
    Dropped { in_flight: i32 },
}

struct InFlightRun {
    run_id: i32,
    done: watch::Receiver<Option<SyncRunSummary>>,
}

#[derive(Default)]
struct RunSlot {
    in_flight: Option<InFlightRun>,
    follow_up_queued: bool,
}

/// A run whose audit record has been opened but that has not executed yet.
struct PendingRun {
    run_id: i32,
    trigger: TriggerSource,
    started_at: DateTime<Utc>,
    scope: Option<Vec<String>>,
    done: watch::Sender<Option<SyncRunSummary>>,
}

/// Coordinates sync runs across all configured business entities. Cheap to clone.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<SyncCoordinatorRef>,
}

struct SyncCoordinatorRef {
    ctx: SyncContext,
    cache: BalanceCache,
    slot: Mutex<RunSlot>,
    alerts: broadcast::Sender<SyncAlert>,
}

impl SyncCoordinator {
    pub fn new(ctx: SyncContext, cache: BalanceCache) -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(SyncCoordinatorRef {
                ctx,
                cache,
                slot: Mutex::new(RunSlot::default()),
                alerts,
            }),
        }
    }

    /// Subscribes to alerts raised when too many entities fail in a run.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<SyncAlert> {
        self.inner.alerts.subscribe()
    }

    /// Requests a run over every configured entity.
    ///
    /// - Nothing in flight: opens a run and starts it in the background.
    /// - Manual trigger while a run is in flight: joins the in-flight run.
    /// - Scheduled trigger while a run is in flight: queues one follow-up run, or is dropped
    ///   when a follow-up is already queued.
    ///
    /// # Returns
    /// - `Ok(TriggerOutcome)` - What happened to the trigger
    /// - `Err(Error::DbErr)` - The run audit record could not be opened
    pub async fn trigger(&self, source: TriggerSource) -> Result<TriggerOutcome, Error> {
        self.trigger_scoped(source, None).await
    }

    /// Like [`SyncCoordinator::trigger`], limited to the given entity slugs when starting a run.
    pub async fn trigger_scoped(
        &self,
        source: TriggerSource,
        scope: Option<Vec<String>>,
    ) -> Result<TriggerOutcome, Error> {
        let mut slot = self.inner.slot.lock().await;

        let in_flight = slot
            .in_flight
            .as_ref()
            .map(|run| (run.run_id, run.done.clone()));

        if let Some((run_id, done)) = in_flight {
            return Ok(match source {
                TriggerSource::Manual => {
                    tracing::info!(run_id, "Manual sync joined in-flight run");
                    TriggerOutcome::Running(RunHandle {
                        run_id,
                        coalesced: true,
                        done,
                    })
                }
                TriggerSource::Schedule if !slot.follow_up_queued => {
                    slot.follow_up_queued = true;
                    tracing::warn!(run_id, "Sync run still in flight, queued one follow-up run");
                    TriggerOutcome::Queued { in_flight: run_id }
                }
                TriggerSource::Schedule => {
                    tracing::warn!(run_id, "Sync run still in flight and follow-up already queued");
                    TriggerOutcome::Dropped { in_flight: run_id }
                }
            });
        }

        let run = self.open_run(source, scope).await?;
        let handle = RunHandle {
            run_id: run.run_id,
            coalesced: false,
            done: run.done.subscribe(),
        };
        slot.in_flight = Some(InFlightRun {
            run_id: run.run_id,
            done: handle.done.clone(),
        });
        drop(slot);

        self.spawn_driver(run);

        Ok(TriggerOutcome::Running(handle))
    }

    /// Runs a sync and waits for its summary.
    ///
    /// A run that is already in flight is joined instead of starting a duplicate.
    ///
    /// # Returns
    /// - `Ok((SyncRunSummary, bool))` - The finalized run and whether it was joined
    /// - `Err(Error)` - The run could not be started
    pub async fn run_sync(
        &self,
        entities: Option<Vec<String>>,
    ) -> Result<(SyncRunSummary, bool), Error> {
        match self.trigger_scoped(TriggerSource::Manual, entities).await? {
            TriggerOutcome::Running(handle) => {
                let coalesced = handle.coalesced;
                Ok((handle.wait().await?, coalesced))
            }
            TriggerOutcome::Queued { in_flight } | TriggerOutcome::Dropped { in_flight } => Err(
                Error::InternalError(format!("manual sync was queued behind run {in_flight}")),
            ),
        }
    }

    /// Opens the audit record of a new run.
    async fn open_run(
        &self,
        trigger: TriggerSource,
        scope: Option<Vec<String>>,
    ) -> Result<PendingRun, Error> {
        let started_at = Utc::now();
        let run = SyncRunRepository::new(&self.inner.ctx.db)
            .start(trigger, started_at.naive_utc())
            .await?;
        let (done, _) = watch::channel(None);

        tracing::info!(run_id = run.id, trigger = trigger.as_str(), "Sync run started");

        Ok(PendingRun {
            run_id: run.id,
            trigger,
            started_at,
            scope,
            done,
        })
    }

    /// Executes runs one after another until no follow-up is queued.
    fn spawn_driver(&self, first: PendingRun) {
        let coordinator = self.clone();

        tokio::spawn(async move {
            let mut run = first;

            loop {
                let summary = coordinator.execute(&run).await;
                coordinator.publish(&summary);

                // Release the slot and report under one lock so no trigger joins a finished run
                let mut slot = coordinator.inner.slot.lock().await;
                run.done.send_replace(Some(summary));
                if !slot.follow_up_queued {
                    slot.in_flight = None;
                    return;
                }
                slot.follow_up_queued = false;

                match coordinator.open_run(TriggerSource::Schedule, None).await {
                    Ok(next) => {
                        slot.in_flight = Some(InFlightRun {
                            run_id: next.run_id,
                            done: next.done.subscribe(),
                        });
                        run = next;
                    }
                    Err(e) => {
                        tracing::error!("Failed to start queued sync run: {}", e);
                        slot.in_flight = None;
                        return;
                    }
                }
            }
        });
    }

    /// Syncs every entity in scope and finalizes the audit record.
    async fn execute(&self, run: &PendingRun) -> SyncRunSummary {
        let (status, reports, failure_reason) = match self.sync_entities(run).await {
            Ok(reports) => (RunStatus::Completed, reports, None),
            Err(e) => {
                tracing::error!(run_id = run.run_id, "Sync run failed: {}", e);
                (RunStatus::Failed, Vec::new(), Some(e.to_string()))
            }
        };

        let finished_at = Utc::now().naive_utc();
        let mut summary = SyncRunSummary {
            run_id: run.run_id,
            trigger: run.trigger,
            status,
            started_at: run.started_at.naive_utc(),
            finished_at,
            reports,
            failure_reason,
        };

        if let Err(e) = SyncRunRepository::new(&self.inner.ctx.db)
            .finalize(
                summary.run_id,
                summary.status,
                finished_at,
                &summary.reports,
                summary.failure_reason.clone(),
            )
            .await
        {
            tracing::error!(run_id = run.run_id, "Failed to finalize sync run record: {}", e);
            summary.status = RunStatus::Failed;
            summary.failure_reason.get_or_insert_with(|| e.to_string());
        }

        let totals = summary.totals();
        tracing::info!(
            run_id = summary.run_id,
            status = summary.status.as_str(),
            synced = summary.synced(),
            errors = summary.errors(),
            accounts_touched = totals.accounts_touched(),
            new_transactions = totals.new_transactions,
            snapshots_written = totals.snapshots_written,
            "Sync run finished"
        );

        summary
    }

    /// Fans entity syncs out as independent tasks and collects their reports.
    ///
    /// # Returns
    /// - `Ok(Vec<EntityReport>)` - One report per entity in scope, ordered by slug
    /// - `Err(Error)` - The run could not start (entities could not be read)
    async fn sync_entities(&self, run: &PendingRun) -> Result<Vec<EntityReport>, Error> {
        let ctx = &self.inner.ctx;
        let observed_at = cycle_start(run.started_at, ctx.settings.cycle)?;
        let mut entities = BusinessEntityRepository::new(&ctx.db).get_all().await?;
        let mut reports = Vec::new();

        if let Some(scope) = &run.scope {
            let known: HashSet<&str> = entities.iter().map(|e| e.slug.as_str()).collect();
            for slug in scope.iter().filter(|slug| !known.contains(slug.as_str())) {
                let err = SyncError::UnknownEntity(slug.clone());
                tracing::warn!(run_id = run.run_id, "{}", err);
                reports.push(EntityReport::skipped(slug, err.to_string()));
            }
            entities.retain(|e| scope.contains(&e.slug));
        }

        let semaphore = Arc::new(Semaphore::new(ctx.settings.entity_concurrency.max(1)));
        let handles: Vec<(String, JoinHandle<EntityReport>)> = entities
            .into_iter()
            .map(|entity| {
                let slug = entity.slug.clone();
                let handle = tokio::spawn(Self::sync_entity_task(
                    ctx.clone(),
                    Arc::clone(&semaphore),
                    entity,
                    observed_at,
                ));
                (slug, handle)
            })
            .collect();

        for (slug, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(entity = %slug, "Entity sync task failed: {}", e);
                    EntityReport::failed(&slug, format!("internal error: {e}"))
                }
            };
            reports.push(report);
        }

        reports.sort_by(|a, b| a.entity.cmp(&b.entity));

        Ok(reports)
    }

    /// One entity sync, bounded by the run semaphore and the entity timeout.
    ///
    /// The timeout starts once a permit is held so queued entities are not penalized.
    async fn sync_entity_task(
        ctx: SyncContext,
        semaphore: Arc<Semaphore>,
        entity: entity::business_entity::Model,
        observed_at: NaiveDateTime,
    ) -> EntityReport {
        let _permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return EntityReport::failed(&entity.slug, "sync run cancelled"),
        };

        let timeout = ctx.settings.entity_timeout;
        let worker = EntitySyncWorker::new(&ctx);

        match tokio::time::timeout(timeout, worker.sync_entity(&entity, observed_at)).await {
            Ok(report) => report,
            Err(_) => {
                let err = SyncError::Timeout {
                    entity: entity.slug.clone(),
                    timeout,
                };
                tracing::error!(entity = %entity.slug, "{}", err);
                EntityReport::failed(&entity.slug, err.to_string())
            }
        }
    }

    /// Invalidates cached balances of every attempted entity and raises the failure alert.
    ///
    /// A failed or timed out entity may still have committed snapshots before it stopped.
    fn publish(&self, summary: &SyncRunSummary) {
        for report in &summary.reports {
            self.inner.cache.invalidate(&report.entity);
        }

        let total = summary.reports.len();
        if total == 0 {
            return;
        }

        let failed_entities: Vec<String> = summary
            .reports
            .iter()
            .filter(|r| !r.outcome.is_synced())
            .map(|r| r.entity.clone())
            .collect();
        let failure_ratio = failed_entities.len() as f64 / total as f64;

        if failure_ratio > self.inner.ctx.settings.alert_failure_ratio {
            tracing::error!(
                run_id = summary.run_id,
                failed = failed_entities.len(),
                total,
                "Sync run failure ratio exceeded alert threshold"
            );

            // No subscribers is fine, alerts are advisory
            let _ = self.inner.alerts.send(SyncAlert {
                run_id: summary.run_id,
                failed_entities,
                total_entities: total,
                failure_ratio,
            });
        }
    }
}
