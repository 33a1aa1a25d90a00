//! Responsible for the delivery route optimization endpoint

use axum::extract::State;
use axum::response::Json;

use crate::api::AppState;
use crate::dal;
use crate::model::api_model::{OptimizeRouteRequest, OptimizeRouteResponse};
use crate::model::order::Order;
use crate::routing;
use crate::routing::sequencer::Route;
use crate::routing::stops::resolve_stops;

/// Geocodes the pending orders and sequences them from the depot.
///
/// Geocoding failures are data, not errors: a stop that can't be
/// resolved trails the route unordered, and the handler never fails
/// because of one.
#[tracing::instrument(skip(state))]
pub async fn optimize_route(
    State(state): State<AppState>,
    body: Option<Json<OptimizeRouteRequest>>,
) -> Json<OptimizeRouteResponse> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let start_point = request
        .start_postcode
        .unwrap_or_else(|| state.config.depot_postcode.clone());

    let (route, orders) = sequence_current_orders(&state).await;

    Json(OptimizeRouteResponse::build(&route, &orders, start_point))
}

/// Shared pipeline of the optimize and print endpoints: snapshot the
/// orders, geocode them, run the sequencer.
pub(crate) async fn sequence_current_orders(state: &AppState) -> (Route, Vec<Order>) {
    let orders = dal::get_orders(&state.store).await;
    let stops = resolve_stops(state.geocoder.clone(), &orders).await;
    let route = routing::sequence(state.config.depot, stops);

    (route, orders)
}
