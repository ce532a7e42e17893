//! Application router configuration for the ledger pages and the JSON API.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    AppState, endpoints,
    error_page::{get_404_not_found, get_internal_server_error_page},
    transaction::{
        create_transaction_api, create_transaction_endpoint, delete_transaction_api,
        delete_transaction_at_api, delete_transaction_endpoint, edit_transaction_endpoint,
        export_transactions, get_index_page, get_ledger_page, get_transactions_api,
        sale_items_endpoint, toggle_done_endpoint, update_transaction_api,
        update_transaction_at_api,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::LEDGER_VIEW,
            get(get_ledger_page).post(create_transaction_endpoint),
        )
        .route(
            endpoints::LEDGER_TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::LEDGER_TOGGLE_DONE, post(toggle_done_endpoint))
        .route(endpoints::SALE_ITEMS, post(sale_items_endpoint))
        .route(endpoints::EXPORT, get(export_transactions))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The JSON API is used by clients on other origins.
    let api_routes = Router::new()
        .route(endpoints::TRANSACTIONS_API, get(get_transactions_api))
        .route(
            endpoints::CREATE_TRANSACTION_API,
            post(create_transaction_api),
        )
        .route(
            endpoints::TRANSACTION_AT_API,
            put(update_transaction_at_api).delete(delete_transaction_at_api),
        )
        .route(
            endpoints::TRANSACTION_API,
            put(update_transaction_api).delete(delete_transaction_api),
        )
        .layer(CorsLayer::permissive());

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
