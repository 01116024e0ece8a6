use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{convert, handlers, middleware::metrics_middleware, ws};
use crate::metrics::encode_metrics;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/tools", get(handlers::get_tools))
        // Capabilities
        .route("/capabilities/{domain}", get(handlers::get_capabilities))
        .route(
            "/documents/allowed-outputs/{ext}",
            get(handlers::get_allowed_outputs),
        )
        // Conversion
        .route("/convert/{domain}", post(convert::convert_batch))
        .route("/convert/{domain}/cancel", post(convert::cancel_batch))
        // Status stream
        .route("/ws", get(ws::ws_handler))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(|| async { encode_metrics() }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
