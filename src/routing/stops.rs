//! Builds geocoded stops from the current orders

use std::sync::Arc;

use itertools::Itertools;
use tokio::task::JoinSet;
use tracing::error;

use crate::geocode::{GeocodeError, Geocoder};
use crate::model::order::Order;
use crate::routing::sequencer::Stop;

/// Resolves every order's postcode into a [`Stop`], one geocoding
/// attempt each, all lookups in flight at once.
///
/// A failed lookup is absorbed: the stop comes back without a
/// coordinate and the sequencer appends it to the tail of the route.
/// The result is in input order, so arrival order of the lookups can't
/// leak into the sequencing.
pub async fn resolve_stops(geocoder: Arc<dyn Geocoder>, orders: &[Order]) -> Vec<Stop> {
    let mut set = JoinSet::new();

    for (index, order) in orders.iter().enumerate() {
        let geocoder = geocoder.clone();
        let stop = Stop::new(
            order.id,
            order.customer_postcode.clone().unwrap_or_default(),
            order.amount(),
        );

        set.spawn(async move {
            let stop = match geocoder.resolve(&stop.postcode).await {
                Ok(coordinate) => stop.with_coordinate(coordinate),
                Err(GeocodeError::EmptyPostcode) => {
                    error!("order {} skipped, no postcode", stop.order_id);
                    stop
                }
                Err(e) => {
                    error!("geocoding failed for order {}: {e}", stop.order_id);
                    stop
                }
            };

            (index, stop)
        });
    }

    let mut indexed = Vec::with_capacity(orders.len());
    while let Some(res) = set.join_next().await {
        match res {
            Ok(entry) => indexed.push(entry),
            Err(e) => error!("geocoding task panicked: {e}"),
        }
    }

    indexed
        .into_iter()
        .sorted_by_key(|(index, _)| *index)
        .map(|(_, stop)| stop)
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::StaticGeocoder;
    use crate::model::order::{Order, OrderStatus};
    use crate::routing::distance::Coordinate;

    fn order(id: i64, postcode: Option<&str>) -> Order {
        Order {
            id,
            basket_no: id,
            delivery_no: format!("D{id:03}"),
            customer_name: format!("Customer {id}"),
            customer_phone: None,
            customer_address: None,
            customer_postcode: postcode.map(str::to_string),
            total_amount: Some(10.0),
            status: OrderStatus::Pending,
            delivery_notes: String::new(),
            delivered_at: None,
        }
    }

    #[tokio::test]
    async fn stops_come_back_in_order_with_failures_absorbed() {
        let geocoder: Arc<dyn Geocoder> = Arc::new(StaticGeocoder::new([
            ("BH13 7EX".to_string(), Coordinate::new(50.7128, -1.9876)),
            ("BH15 1AA".to_string(), Coordinate::new(50.7192, -1.9806)),
        ]));

        let orders = vec![
            order(1, Some("BH15 1AA")),
            order(2, None),
            order(3, Some("ZZ99 9ZZ")),
            order(4, Some("bh137ex")),
        ];

        let stops = resolve_stops(geocoder, &orders).await;

        assert_eq!(stops.len(), 4);
        assert_eq!(
            stops.iter().map(|s| s.order_id).collect_vec(),
            vec![1, 2, 3, 4]
        );
        assert!(stops[0].coordinate.is_some());
        assert!(stops[1].coordinate.is_none());
        assert!(stops[2].coordinate.is_none());
        assert!(stops[3].coordinate.is_some());
        assert_eq!(stops[0].amount, 10.0);
    }

    #[tokio::test]
    async fn no_orders_means_no_stops() {
        let geocoder: Arc<dyn Geocoder> = Arc::new(StaticGeocoder::default());
        let stops = resolve_stops(geocoder, &[]).await;
        assert!(stops.is_empty());
    }
}
