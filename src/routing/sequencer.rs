//! Orders delivery stops by repeatedly driving to the nearest one left.

use crate::routing::distance::{Coordinate, haversine_km};

/// One delivery destination derived from an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub order_id: i64,
    pub postcode: String,
    /// Present only when geocoding succeeded.
    pub coordinate: Option<Coordinate>,
    /// Distance from the previous point in the route (depot or prior
    /// stop), assigned by [`sequence`]. Not the distance from the depot
    /// for stops after the first.
    pub leg_km: Option<f64>,
    /// 1-based visiting position, assigned by [`sequence`].
    pub position: Option<usize>,
    /// Order value, missing or non numeric amounts already read as 0.
    pub amount: f64,
}

impl Stop {
    pub fn new(order_id: i64, postcode: impl Into<String>, amount: f64) -> Self {
        Stop {
            order_id,
            postcode: postcode.into(),
            coordinate: None,
            leg_km: None,
            position: None,
            amount,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}

/// A sequenced route. Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub stops: Vec<Stop>,
    /// Sum of the leg distances of the geocoded stops.
    pub total_km: f64,
    /// Set when not a single stop had a resolvable coordinate, so there
    /// was nothing to order by distance.
    pub nothing_to_optimize: bool,
}

impl Route {
    pub fn summary(&self) -> RouteSummary {
        let stop_count = self.stops.len();
        let total_value: f64 = self.stops.iter().map(|s| s.amount).sum();
        let average_value = if stop_count == 0 {
            0.0
        } else {
            total_value / stop_count as f64
        };

        RouteSummary {
            stop_count,
            total_km: self.total_km,
            total_value,
            average_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub stop_count: usize,
    pub total_km: f64,
    pub total_value: f64,
    pub average_value: f64,
}

/// Nearest neighbor ordering from the depot.
///
/// Greedy, not globally optimal: at every step the closest remaining
/// geocoded stop is visited next. Ties go to the earliest stop in input
/// order. Stops without a coordinate are appended at the end in their
/// original relative order and carry no leg distance. The output always
/// holds exactly the input stops.
pub fn sequence(depot: Coordinate, stops: Vec<Stop>) -> Route {
    let mut remaining: Vec<(Stop, Coordinate)> = vec![];
    let mut unresolved: Vec<Stop> = vec![];

    for stop in stops {
        match stop.coordinate {
            Some(coordinate) => remaining.push((stop, coordinate)),
            None => unresolved.push(stop),
        }
    }

    let nothing_to_optimize = remaining.is_empty();

    let mut sequenced: Vec<Stop> = Vec::with_capacity(remaining.len() + unresolved.len());
    let mut current = depot;
    let mut total_km = 0.0;

    while !remaining.is_empty() {
        let mut nearest_index = 0;
        let mut min_km = f64::INFINITY;

        for (index, (_, coordinate)) in remaining.iter().enumerate() {
            let km = haversine_km(current, *coordinate);
            if km < min_km {
                min_km = km;
                nearest_index = index;
            }
        }

        let (mut stop, coordinate) = remaining.remove(nearest_index);
        stop.leg_km = Some(min_km);
        total_km += min_km;
        current = coordinate;
        sequenced.push(stop);
    }

    sequenced.extend(unresolved);

    for (index, stop) in sequenced.iter_mut().enumerate() {
        stop.position = Some(index + 1);
    }

    Route {
        stops: sequenced,
        total_km,
        nothing_to_optimize,
    }
}

/// Two decimal places, the resolution distances are reported at.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    const DEPOT: Coordinate = Coordinate {
        latitude: 50.7128,
        longitude: -1.9876,
    };

    fn stop_at(order_id: i64, coordinate: Coordinate) -> Stop {
        Stop::new(order_id, format!("PC{order_id}"), 0.0).with_coordinate(coordinate)
    }

    #[test]
    fn single_stop_on_the_depot_has_a_zero_leg() {
        let route = sequence(DEPOT, vec![stop_at(1, DEPOT)]);

        assert_eq!(route.stops.len(), 1);
        assert!(route.stops[0].leg_km.unwrap() < 1e-9);
        assert!(route.total_km < 1e-9);
        assert!(!route.nothing_to_optimize);
    }

    #[test]
    fn greedy_picks_the_stop_nearest_the_depot_first() {
        // On the equator one degree of longitude is ~111.2 km, so Y sits
        // ~2 km from the depot and X ~5 km on the other side.
        let depot = Coordinate::new(0.0, 0.0);
        let x = Coordinate::new(0.0, -0.045);
        let y = Coordinate::new(0.0, 0.018);

        let route = sequence(depot, vec![stop_at(1, x), stop_at(2, y)]);

        let ids = route.stops.iter().map(|s| s.order_id).collect_vec();
        assert_eq!(ids, vec![2, 1]);

        // Second leg is measured from Y, not from the depot.
        let expected = haversine_km(depot, y) + haversine_km(y, x);
        assert!((route.total_km - expected).abs() < 1e-9);
        assert!(route.stops[1].leg_km.unwrap() > haversine_km(depot, x));
    }

    #[test]
    fn ties_go_to_the_first_stop_in_input_order() {
        let spot = Coordinate::new(50.72, -1.98);
        let route = sequence(DEPOT, vec![stop_at(7, spot), stop_at(3, spot)]);

        let ids = route.stops.iter().map(|s| s.order_id).collect_vec();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn ungeocoded_stops_trail_in_original_order_with_no_leg() {
        let near = Coordinate::new(50.72, -1.98);
        let far = Coordinate::new(50.80, -1.80);

        let stops = vec![
            Stop::new(1, "", 10.0),
            stop_at(2, far),
            Stop::new(3, "", 5.0),
            stop_at(4, near),
        ];

        let route = sequence(DEPOT, stops);

        let ids = route.stops.iter().map(|s| s.order_id).collect_vec();
        assert_eq!(ids, vec![4, 2, 1, 3]);
        assert!(route.stops[2].leg_km.is_none());
        assert!(route.stops[3].leg_km.is_none());

        let expected = haversine_km(DEPOT, near) + haversine_km(near, far);
        assert!((route.total_km - expected).abs() < 1e-9);
    }

    #[test]
    fn positions_cover_the_whole_route() {
        let stops = vec![
            stop_at(1, Coordinate::new(50.72, -1.98)),
            Stop::new(2, "", 0.0),
        ];

        let route = sequence(DEPOT, stops);

        let positions = route.stops.iter().map(|s| s.position).collect_vec();
        assert_eq!(positions, vec![Some(1), Some(2)]);
    }

    #[test]
    fn no_stops_at_all_is_flagged_as_nothing_to_optimize() {
        let route = sequence(DEPOT, vec![]);

        assert!(route.stops.is_empty());
        assert_eq!(route.total_km, 0.0);
        assert!(route.nothing_to_optimize);
    }

    #[test]
    fn only_ungeocoded_stops_is_flagged_too() {
        let route = sequence(DEPOT, vec![Stop::new(1, "", 0.0), Stop::new(2, "", 0.0)]);

        assert!(route.nothing_to_optimize);
        assert_eq!(route.total_km, 0.0);
        let ids = route.stops.iter().map(|s| s.order_id).collect_vec();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn sequencing_is_deterministic() {
        let stops = vec![
            stop_at(1, Coordinate::new(50.75, -1.90)),
            stop_at(2, Coordinate::new(50.71, -2.01)),
            Stop::new(3, "", 12.0),
            stop_at(4, Coordinate::new(50.68, -1.95)),
        ];

        let first = sequence(DEPOT, stops.clone());
        let second = sequence(DEPOT, stops);

        assert_eq!(first, second);
        assert_eq!(first.stops.len(), 4);
    }

    #[test]
    fn summary_guards_the_empty_average() {
        let route = sequence(DEPOT, vec![]);
        let summary = route.summary();

        assert_eq!(summary.stop_count, 0);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.average_value, 0.0);
    }

    #[test]
    fn summary_totals_the_order_values() {
        let stops = vec![
            Stop::new(1, "", 80.0).with_coordinate(Coordinate::new(50.72, -1.98)),
            Stop::new(2, "", 0.0),
            Stop::new(3, "", 40.0).with_coordinate(Coordinate::new(50.73, -1.97)),
        ];

        let summary = sequence(DEPOT, stops).summary();

        assert_eq!(summary.stop_count, 3);
        assert_eq!(summary.total_value, 120.0);
        assert_eq!(summary.average_value, 40.0);
    }

    #[test]
    fn rounding_matches_the_reported_resolution() {
        assert_eq!(round_km(12.345), 12.35);
        assert_eq!(round_km(12.344), 12.34);
        assert_eq!(round_km(0.0), 0.0);
    }
}
