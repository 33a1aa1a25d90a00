//! Request and response bodies of the route endpoints

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::order::Order;
use crate::routing::distance::Coordinate;
use crate::routing::sequencer::{Route, round_km};

/// Body of `POST /api/optimize-route` and `POST /api/print-route`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteRequest {
    #[serde(default)]
    pub start_postcode: Option<String>,
}

/// One sequenced stop: the order it came from plus what the sequencer
/// attached to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStopBody {
    #[serde(flatten)]
    pub order: Order,
    /// Absent when geocoding failed for this stop.
    pub coordinates: Option<Coordinate>,
    /// Distance from the previous point in the route, km.
    pub leg_distance: Option<f64>,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteResponse {
    pub route: Vec<RouteStopBody>,
    /// Kilometers, rounded to two decimal places.
    pub total_distance: f64,
    pub start_point: String,
    pub nothing_to_optimize: bool,
    pub message: String,
}

impl OptimizeRouteResponse {
    pub fn build(route: &Route, orders: &[Order], start_point: String) -> OptimizeRouteResponse {
        let by_id: HashMap<i64, &Order> = orders.iter().map(|o| (o.id, o)).collect();

        let stops = route
            .stops
            .iter()
            .enumerate()
            .filter_map(|(index, stop)| {
                by_id.get(&stop.order_id).map(|order| RouteStopBody {
                    order: (*order).clone(),
                    coordinates: stop.coordinate,
                    leg_distance: stop.leg_km,
                    position: stop.position.unwrap_or(index + 1),
                })
            })
            .collect_vec();

        let message = if route.nothing_to_optimize {
            "No stops with a resolvable postcode, nothing to optimize".to_string()
        } else {
            "Route optimized successfully with nearest neighbor algorithm".to_string()
        };

        OptimizeRouteResponse {
            route: stops,
            total_distance: round_km(route.total_km),
            start_point,
            nothing_to_optimize: route.nothing_to_optimize,
            message,
        }
    }
}
