//! HTTP surface of the catalog.

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::store::PortfolioStore;

pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use handlers::*;

/// Shared handler state; the store is chosen and built by the caller.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortfolioStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PortfolioStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/portafolio", get(list_portafolio).post(create_portafolio))
        .route(
            "/portafolio/{codigo_hptu}",
            get(get_portafolio)
                .put(update_portafolio)
                .delete(delete_portafolio),
        )
        .route("/portafolio/{codigo_hptu}/tarifa", patch(adjust_tarifa))
        .route("/portafolio/grupo/{grupo_concepto}", get(list_portafolio_by_group))
        .route(
            "/portafolio/grupo/{grupo_concepto}/tarifa",
            patch(adjust_tarifa_by_group),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
