//! HTTP routing and OpenAPI documentation configuration.
//!
//! All API endpoints are registered here with their OpenAPI specifications, and Swagger UI is
//! served at `/api/docs`.

use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{controller, model::app::AppState};

/// Builds the application's HTTP router with all API endpoints and Swagger UI documentation.
///
/// # Registered Endpoints
/// - `POST /api/sync` - Run a sync now and report its result
/// - `GET /api/sync/runs` - Recent sync runs with per-entity outcomes
/// - `GET /api/balances` - Cached latest balance per bank account
/// - `GET /api/transactions` - Filtered, paginated transactions
///
/// # Returns
/// An Axum `Router<AppState>` ready to have its state attached.
///
/// # Example
/// ```ignore
/// let router = routes().with_state(app_state);
/// ```
pub fn routes() -> Router<AppState> {
    #[derive(OpenApi)]
    #[openapi(info(title = "Empire", description = "Empire Portal bank sync API"), tags(
        (name = controller::sync::SYNC_TAG, description = "Sync runs and their audit trail"),
        (name = controller::balance::BALANCE_TAG, description = "Cached account balances"),
        (name = controller::transaction::TRANSACTION_TAG, description = "Reconciled transactions"),
    ))]
    struct ApiDoc;

    let (routes, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(controller::sync::trigger_sync))
        .routes(routes!(controller::sync::get_sync_runs))
        .routes(routes!(controller::balance::get_balances))
        .routes(routes!(controller::transaction::get_transactions))
        .split_for_parts();

    routes.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", api))
}
