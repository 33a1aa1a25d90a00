//! Responsible for the printable route sheet endpoint

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use chrono::Local;

use crate::api::AppState;
use crate::api::optimize::sequence_current_orders;
use crate::model::api_model::OptimizeRouteRequest;
use crate::report::RouteReport;

/// Runs the same pipeline as the optimize endpoint and hands the result
/// to the configured report formatter, served as a download.
#[tracing::instrument(skip(state))]
pub async fn print_route(
    State(state): State<AppState>,
    body: Option<Json<OptimizeRouteRequest>>,
) -> Response {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let start_point = request
        .start_postcode
        .unwrap_or_else(|| state.config.depot_postcode.clone());

    let (route, orders) = sequence_current_orders(&state).await;

    let today = Local::now().date_naive();
    let report = RouteReport::build(
        &route,
        &orders,
        start_point,
        state.config.depot_name.clone(),
        today,
    );

    let document = state.formatter.render(&report);
    let filename = format!(
        "route-{}.{}",
        today.format("%Y-%m-%d"),
        state.formatter.file_extension()
    );

    (
        [
            (header::CONTENT_TYPE, state.formatter.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        document,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use crate::dal;
    use crate::model::order::{NewOrder, OrderStatus};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn print_route_serves_a_text_attachment() {
        let state = test_state("print").await;
        dal::insert_order(
            &state.store,
            NewOrder {
                customer_name: "John Smith".to_string(),
                customer_phone: None,
                customer_address: Some("123 High Street".to_string()),
                customer_postcode: Some("BH15 1AA".to_string()),
                total_amount: Some(45.0),
                status: OrderStatus::Pending,
            },
        )
        .await
        .unwrap();

        let response = print_route(State(state.clone()), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"route-"));
        assert!(disposition.ends_with(".txt\""));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("John Smith"));
        assert!(text.contains("Total Revenue: £45.00"));

        tokio::fs::remove_file(&state.config.data_file).await.ok();
    }
}
