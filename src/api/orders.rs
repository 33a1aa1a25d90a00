use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::api::{ApiError, ApiMessage, AppState, publish_snapshot};
use crate::dal;
use crate::model::order::{NewOrder, Order, UpdateOrder};

pub async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(dal::get_orders(&state.store).await)
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(new_order): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = dal::insert_order(&state.store, new_order).await?;
    publish_snapshot(&state).await;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateOrder>,
) -> Result<Json<Order>, ApiError> {
    let order = dal::update_order(&state.store, id, changes).await?;
    publish_snapshot(&state).await;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiMessage>, ApiError> {
    dal::delete_order(&state.store, id).await?;
    publish_snapshot(&state).await;
    Ok(Json(ApiMessage::new("Order deleted")))
}
