//! Responsible for rendering a sequenced route into a printable document

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::order::Order;
use crate::routing::sequencer::{Route, round_km};

/// Everything a formatter needs to lay out the driver's sheet.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub generated_on: NaiveDate,
    pub start_postcode: String,
    pub depot_name: String,
    pub rows: Vec<ReportRow>,
    pub total_km: f64,
    pub total_value: f64,
    pub average_value: f64,
    pub nothing_to_optimize: bool,
}

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub position: usize,
    pub basket_no: i64,
    pub customer_name: String,
    pub address: String,
    pub postcode: String,
    pub leg_km: Option<f64>,
    pub amount: f64,
}

impl RouteReport {
    pub fn build(
        route: &Route,
        orders: &[Order],
        start_postcode: impl Into<String>,
        depot_name: impl Into<String>,
        generated_on: NaiveDate,
    ) -> RouteReport {
        let by_id: HashMap<i64, &Order> = orders.iter().map(|o| (o.id, o)).collect();

        let rows = route
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| {
                let order = by_id.get(&stop.order_id);
                ReportRow {
                    position: stop.position.unwrap_or(index + 1),
                    basket_no: order.map(|o| o.basket_no).unwrap_or(stop.order_id),
                    customer_name: order
                        .map(|o| o.customer_name.clone())
                        .unwrap_or_default(),
                    address: order
                        .and_then(|o| o.customer_address.clone())
                        .unwrap_or_default(),
                    postcode: stop.postcode.clone(),
                    leg_km: stop.leg_km,
                    amount: stop.amount,
                }
            })
            .collect_vec();

        let summary = route.summary();

        RouteReport {
            generated_on,
            start_postcode: start_postcode.into(),
            depot_name: depot_name.into(),
            rows,
            total_km: summary.total_km,
            total_value: summary.total_value,
            average_value: summary.average_value,
            nothing_to_optimize: route.nothing_to_optimize,
        }
    }
}

/// Boundary for the document renderer so a richer one (PDF and friends)
/// can be slotted in without touching the handlers.
pub trait RouteReportFormatter: Send + Sync {
    fn media_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    fn render(&self, report: &RouteReport) -> Vec<u8>;
}

/// Fixed-width plain text sheet, good enough for a thermal printer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReportFormatter;

impl RouteReportFormatter for TextReportFormatter {
    fn media_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, report: &RouteReport) -> Vec<u8> {
        let mut out = String::new();

        _ = writeln!(out, "MagicSell - Delivery Route");
        _ = writeln!(out, "==========================");
        _ = writeln!(out);
        _ = writeln!(out, "Date: {}", report.generated_on.format("%Y-%m-%d"));
        _ = writeln!(
            out,
            "Start Point: {} ({})",
            report.start_postcode, report.depot_name
        );
        _ = writeln!(out, "Total Orders: {}", report.rows.len());
        _ = writeln!(out);

        _ = writeln!(out, "Delivery Route:");
        _ = writeln!(
            out,
            "{:<4} {:<7} {:<22} {:<28} {:<9} {:>9} {:>9}",
            "No.", "Basket", "Customer", "Address", "Postcode", "Distance", "Price"
        );
        for row in &report.rows {
            let distance = match row.leg_km {
                Some(km) => format!("{:.2} km", round_km(km)),
                None => "-".to_string(),
            };
            _ = writeln!(
                out,
                "{:<4} {:<7} {:<22} {:<28} {:<9} {:>9} {:>9}",
                row.position,
                row.basket_no,
                row.customer_name,
                row.address,
                row.postcode,
                distance,
                format!("£{:.2}", row.amount),
            );
        }
        _ = writeln!(out);

        _ = writeln!(out, "Route Summary");
        _ = writeln!(out, "-------------");
        if report.nothing_to_optimize {
            _ = writeln!(out, "No stops could be placed on an optimized route.");
        }
        _ = writeln!(out, "Total Distance: {:.2} km", round_km(report.total_km));
        _ = writeln!(out, "Total Orders: {}", report.rows.len());
        _ = writeln!(out, "Total Revenue: £{:.2}", report.total_value);
        _ = writeln!(out, "Average Order Value: £{:.2}", report.average_value);
        _ = writeln!(out);

        _ = writeln!(out, "Delivery Notes:");
        _ = writeln!(
            out,
            "- Start from {} ({})",
            report.depot_name, report.start_postcode
        );
        _ = writeln!(out, "- Follow the optimized route order for efficiency");
        _ = writeln!(out, "- Collect payments at each delivery point");
        _ = writeln!(out, "- Update order status after each delivery");

        out.into_bytes()
    }
}
