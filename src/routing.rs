//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, services::ServeDir};

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    error_pages::get_404_not_found,
    transaction::{
        create_transaction_endpoint, create_transaction_form_endpoint,
        create_transactions_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(
            endpoints::TRANSACTIONS_FORM,
            post(create_transaction_form_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::BULK_TRANSACTIONS_API,
            post(create_transactions_endpoint),
        )
        .route(endpoints::HEALTH, get(get_health))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Lets clients check that the server is reachable.
async fn get_health() -> &'static str {
    "ok"
}
