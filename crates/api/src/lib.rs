//! HTTP API server with observability for the dormitory bed tracker.
//!
//! Provides REST endpoints for rooms, bed allotments and occupancy
//! summaries, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::{AllotmentLedger, RoomRegistry};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::SummaryProjector;
use schema_store::SchemaStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: SchemaStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route(
            "/rooms",
            post(routes::rooms::create::<S>).get(routes::rooms::list::<S>),
        )
        .route(
            "/rooms/{id}",
            get(routes::rooms::get::<S>)
                .put(routes::rooms::update::<S>)
                .delete(routes::rooms::delete::<S>),
        )
        .route("/rooms/{id}/beds", get(routes::rooms::beds::<S>))
        .route(
            "/rooms/{id}/allotments",
            post(routes::allotments::allot::<S>),
        )
        .route(
            "/rooms/{id}/allotments/{allotment_id}",
            delete(routes::allotments::remove::<S>),
        )
        .route("/rooms/{id}/revert", post(routes::allotments::revert::<S>))
        .route("/summaries/floor-ac", get(routes::summaries::floor_ac::<S>))
        .route("/summaries/overall", get(routes::summaries::overall::<S>))
        .route("/summaries/floors", get(routes::summaries::floors::<S>))
        .route("/summaries/ac-types", get(routes::summaries::ac_types::<S>))
        .route("/reports/occupancy", get(routes::summaries::occupancy::<S>))
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

/// Creates the application state, sharing one store between all services.
pub fn create_state<S: SchemaStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        registry: RoomRegistry::new(store.clone()),
        ledger: AllotmentLedger::new(store.clone()),
        projector: SummaryProjector::new(store),
    })
}
