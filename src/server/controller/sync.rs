use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    model::{
        api::{ApiResponse, ErrorBody},
        sync::{EntityOutcomeDto, SyncResultDto, SyncRunDto},
    },
    server::{
        controller::params::ParamErrors,
        data::sync_run::{SyncRunRepository, SyncRunWithOutcomes},
        error::Error,
        model::{app::AppState, outcome::RunStatus},
    },
};

pub static SYNC_TAG: &str = "sync";

const DEFAULT_RUNS_LIMIT: u64 = 20;
const MAX_RUNS_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SyncParams {
    /// Comma separated entity slugs to limit the run to
    pub entity_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SyncRunsParams {
    /// Number of runs to return, 1 to 100, defaults to 20
    pub limit: Option<String>,
}

/// Sync balances and transactions of every business entity now
///
/// Waits for the run to finish. A request that arrives while a run is in flight joins that
/// run and reports its result. Always answers 200; entities that failed are counted in
/// `errors`, and a run that could not start has no `runId` and a `failed` status.
#[utoipa::path(
    post,
    path = "/api/sync",
    tag = SYNC_TAG,
    params(SyncParams),
    responses(
        (status = 200, description = "Result of the sync run", body = SyncResultDto),
    ),
)]
pub async fn trigger_sync(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
) -> impl IntoResponse {
    let scope = params.entity_id.map(|ids| {
        ids.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let result = match state.coordinator.run_sync(scope).await {
        Ok((summary, coalesced)) => SyncResultDto {
            run_id: Some(summary.run_id),
            synced: summary.synced(),
            errors: summary.errors(),
            status: summary.status.as_str().to_string(),
            coalesced,
        },
        Err(e) => {
            tracing::error!("Failed to run on-demand sync: {}", e);

            SyncResultDto {
                run_id: None,
                synced: 0,
                errors: 0,
                status: RunStatus::Failed.as_str().to_string(),
                coalesced: false,
            }
        }
    };

    (StatusCode::OK, Json(ApiResponse::success(result)))
}

/// Get the most recent sync runs with their per-entity outcomes
#[utoipa::path(
    get,
    path = "/api/sync/runs",
    tag = SYNC_TAG,
    params(SyncRunsParams),
    responses(
        (status = 200, description = "Most recent sync runs, newest first", body = Vec<SyncRunDto>),
        (status = 400, description = "Invalid query parameters", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
)]
pub async fn get_sync_runs(
    State(state): State<AppState>,
    Query(params): Query<SyncRunsParams>,
) -> Result<impl IntoResponse, Error> {
    let mut errors = ParamErrors::new();
    let limit = errors
        .parse_in_range("limit", params.limit.as_deref(), 1, MAX_RUNS_LIMIT)
        .unwrap_or(DEFAULT_RUNS_LIMIT);
    errors.into_result()?;

    let runs = SyncRunRepository::new(&state.db).latest(limit).await?;
    let runs: Vec<SyncRunDto> = runs.into_iter().map(to_run_dto).collect();

    Ok((StatusCode::OK, Json(ApiResponse::success(runs))))
}

fn to_run_dto((run, outcomes): SyncRunWithOutcomes) -> SyncRunDto {
    SyncRunDto {
        id: run.id,
        trigger: run.trigger,
        status: run.status,
        started_at: run.started_at,
        finished_at: run.finished_at,
        entities_synced: run.entities_synced,
        entities_failed: run.entities_failed,
        accounts_touched: run.accounts_touched,
        new_transactions: run.new_transactions,
        snapshots_written: run.snapshots_written,
        failure_reason: run.failure_reason,
        outcomes: outcomes
            .into_iter()
            .map(|o| EntityOutcomeDto {
                entity_id: o.entity_slug,
                outcome: o.outcome,
                reason: o.reason,
                accounts_synced: o.accounts_synced,
                accounts_failed: o.accounts_failed,
                new_transactions: o.new_transactions,
                snapshots_written: o.snapshots_written,
            })
            .collect(),
    }
}
