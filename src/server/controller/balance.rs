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
        balance::{BalanceDto, BalancesDto},
    },
    server::{
        controller::params::ParamErrors,
        data::balance::AccountBalance,
        error::{sync::SyncError, validation::ValidationError, Error},
        model::app::AppState,
    },
};

pub static BALANCE_TAG: &str = "balance";

/// Warning attached to balances older than the maximum staleness window
pub const STALE_BEYOND_LIMIT: &str = "STALE_BEYOND_LIMIT";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BalanceParams {
    /// Slug of the business entity, all entities when absent
    pub entity_id: Option<String>,
}

/// Get the latest cached balance of each bank account
#[utoipa::path(
    get,
    path = "/api/balances",
    tag = BALANCE_TAG,
    params(BalanceParams),
    responses(
        (status = 200, description = "Latest balances with their freshness", body = BalancesDto),
        (status = 400, description = "Invalid or unknown entity", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
)]
pub async fn get_balances(
    State(state): State<AppState>,
    Query(params): Query<BalanceParams>,
) -> Result<impl IntoResponse, Error> {
    let mut errors = ParamErrors::new();
    let entity = errors.entity_slug("entityId", params.entity_id.as_deref());
    errors.into_result()?;

    let cached = match state.cache.get_balances(entity.as_deref()).await {
        Ok(cached) => cached,
        Err(Error::SyncError(SyncError::UnknownEntity(slug))) => {
            return Err(ValidationError::single("entityId", format!("unknown entity {slug}")).into());
        }
        Err(e) => return Err(e),
    };

    let dto = BalancesDto {
        balances: cached.balances.iter().map(to_balance_dto).collect(),
        is_stale: cached.is_stale,
        warning: cached
            .stale_beyond_limit
            .then(|| STALE_BEYOND_LIMIT.to_string()),
    };

    Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
}

fn to_balance_dto(balance: &AccountBalance) -> BalanceDto {
    BalanceDto {
        entity_id: balance.entity_slug.clone(),
        account_id: balance.account.id,
        external_account_id: balance.account.external_id.clone(),
        account_name: balance.account.name.clone(),
        account_kind: balance.account.kind.clone(),
        account_status: balance.account.status.clone(),
        masked_account_number: balance.account.masked_account_number.clone(),
        balance: balance.snapshot.balance,
        available: balance.snapshot.available,
        currency: balance.snapshot.currency.clone(),
        observed_at: balance.snapshot.observed_at,
    }
}
