//! HTTP API server for the order-management system.
//!
//! Provides the REST surface over the domain services, with
//! structured logging (tracing) and Prometheus metrics. Request-shape
//! validation (field presence, lengths, value ranges) happens here;
//! business invariants live in the domain crate.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use domain::{AccountService, CustomerService, OrderService, ProductService};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::MemoryStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub customers: CustomerService,
    pub accounts: AccountService,
    pub products: ProductService,
    pub orders: OrderService,
}

/// Creates the application state with all services sharing one store.
pub fn create_default_state(store: MemoryStore) -> Arc<AppState> {
    Arc::new(AppState {
        customers: CustomerService::new(store.clone()),
        accounts: AccountService::new(store.clone()),
        products: ProductService::new(store.clone()),
        orders: OrderService::new(store),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/customers",
            get(routes::customers::list).post(routes::customers::create),
        )
        .route(
            "/customers/{id}",
            get(routes::customers::detail)
                .put(routes::customers::update)
                .delete(routes::customers::delete),
        )
        .route(
            "/customer_accounts",
            get(routes::accounts::list).post(routes::accounts::create),
        )
        .route(
            "/customer_accounts/{customer_id}",
            axum::routing::put(routes::accounts::update).delete(routes::accounts::delete),
        )
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/products/{id}",
            axum::routing::put(routes::products::update).delete(routes::products::delete),
        )
        .route(
            "/orders",
            get(routes::orders::list).post(routes::orders::create),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::detail)
                .put(routes::orders::update)
                .delete(routes::orders::delete),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
