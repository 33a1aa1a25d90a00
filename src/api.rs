//! HTTP surface of the backend

pub mod customers;
pub mod optimize;
pub mod orders;
pub mod print;
pub mod updates;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::AppConfig;
use crate::dal::store::{Store, StoreError};
use crate::geocode::Geocoder;
use crate::notify::{DataUpdate, UpdateBroadcaster, UpdateSink};
use crate::report::RouteReportFormatter;

/// Everything a handler needs, passed explicitly instead of living in
/// process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub geocoder: Arc<dyn Geocoder>,
    pub updates: Arc<UpdateBroadcaster>,
    pub formatter: Arc<dyn RouteReportFormatter>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/api/orders/{id}",
            put(orders::update_order).delete(orders::delete_order),
        )
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/api/customers/{id}",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .route("/api/optimize-route", post(optimize::optimize_route))
        .route("/api/print-route", post(print::print_route))
        .route("/api/updates", get(updates::updates))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<ApiMessage> {
    Json(ApiMessage::new("MagicSell Backend API"))
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> ApiMessage {
        ApiMessage {
            message: message.into(),
        }
    }
}

/// Handler-level failure, rendered as the `{ "message": ... }` body the
/// clients expect.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiMessage::new(self.message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> ApiError {
        match e {
            StoreError::NotFound { entity, .. } => ApiError {
                status: StatusCode::NOT_FOUND,
                message: format!("{entity} not found"),
            },
            other => {
                error!("store failure: {other}");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Error saving data".to_string(),
                }
            }
        }
    }
}

/// Pushes the post-mutation snapshot to every connected client.
pub(crate) async fn publish_snapshot(state: &AppState) {
    let data = state.store.snapshot().await;
    state.updates.publish(DataUpdate {
        orders: data.orders,
        customers: data.customers,
    });
}
