use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    model::{
        api::{ApiResponse, ErrorBody},
        transaction::{TransactionDto, TransactionPageDto},
    },
    server::{
        controller::params::ParamErrors,
        data::{
            entity::BusinessEntityRepository,
            transaction::{BankTransactionRepository, TransactionFilter},
            Pagination, DEFAULT_PAGE_SIZE, MAX_OFFSET, MAX_PAGE_SIZE,
        },
        error::{validation::ValidationError, Error},
        model::app::AppState,
        util::amount::to_minor_units,
    },
};

pub static TRANSACTION_TAG: &str = "transaction";

/// Query parameters of the transaction search, kept as raw strings so every invalid field
/// can be reported at once
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    /// Slug of the business entity
    pub entity_id: Option<String>,
    /// ID of the bank account
    pub account_id: Option<String>,
    /// Earliest transaction date, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Latest transaction date, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// Smallest amount in major units, e.g. `-250.00`
    pub min_amount: Option<String>,
    /// Largest amount in major units
    pub max_amount: Option<String>,
    /// Substring of the description, counterparty or note
    pub search: Option<String>,
    /// Page size, 1 to 1000, defaults to 100
    pub limit: Option<String>,
    /// Rows to skip, defaults to 0
    pub offset: Option<String>,
}

/// Search stored transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = TRANSACTION_TAG,
    params(TransactionParams),
    responses(
        (status = 200, description = "One page of matching transactions, newest first", body = TransactionPageDto),
        (status = 400, description = "Invalid query parameters", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionParams>,
) -> Result<impl IntoResponse, Error> {
    let mut errors = ParamErrors::new();

    let entity = errors.entity_slug("entityId", params.entity_id.as_deref());
    let account_id: Option<i32> =
        errors.parse_in_range("accountId", params.account_id.as_deref(), 1, i32::MAX);
    let start_date: Option<NaiveDate> =
        errors.parse("startDate", params.start_date.as_deref(), "must be a date (YYYY-MM-DD)");
    let end_date: Option<NaiveDate> =
        errors.parse("endDate", params.end_date.as_deref(), "must be a date (YYYY-MM-DD)");
    let min_amount = parse_amount(&mut errors, "minAmount", params.min_amount.as_deref());
    let max_amount = parse_amount(&mut errors, "maxAmount", params.max_amount.as_deref());
    let limit: Option<u64> =
        errors.parse_in_range("limit", params.limit.as_deref(), 1, MAX_PAGE_SIZE);
    let offset: Option<u64> =
        errors.parse_in_range("offset", params.offset.as_deref(), 0, MAX_OFFSET);

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            errors.push("endDate", "must not be before startDate");
        }
    }
    if let (Some(min), Some(max)) = (min_amount, max_amount) {
        if min > max {
            errors.push("maxAmount", "must not be lower than minAmount");
        }
    }
    errors.into_result()?;

    let entity_id = match entity {
        Some(slug) => match BusinessEntityRepository::new(&state.db)
            .find_by_slug(&slug)
            .await?
        {
            Some(entity) => Some(entity.id),
            None => {
                return Err(
                    ValidationError::single("entityId", format!("unknown entity {slug}")).into(),
                )
            }
        },
        None => None,
    };

    let filter = TransactionFilter {
        entity_id,
        account_id,
        start_date,
        end_date,
        min_amount,
        max_amount,
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let pagination = Pagination::new(Some(limit.unwrap_or(DEFAULT_PAGE_SIZE)), offset);

    let page = BankTransactionRepository::new(&state.db)
        .search(&filter, pagination)
        .await?;

    let dto = TransactionPageDto {
        items: page
            .items
            .into_iter()
            .map(|t| TransactionDto {
                id: t.id,
                account_id: t.account_id,
                external_id: t.external_id,
                date: t.date,
                description: t.description,
                amount: t.amount,
                status: t.status,
                category: t.category,
                counterparty: t.counterparty,
                note: t.note,
                posted_at: t.posted_at,
            })
            .collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    };

    Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
}

fn parse_amount(errors: &mut ParamErrors, field: &str, value: Option<&str>) -> Option<i64> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    let amount = to_minor_units(value);
    if amount.is_none() {
        errors.push(field, "must be a decimal amount with at most 2 fractional digits");
    }
    amount
}
