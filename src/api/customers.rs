use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::api::{ApiError, ApiMessage, AppState, publish_snapshot};
use crate::dal;
use crate::model::customer::{Customer, NewCustomer, UpdateCustomer};

pub async fn list_customers(State(state): State<AppState>) -> Json<Vec<Customer>> {
    Json(dal::get_customers(&state.store).await)
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(new_customer): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = dal::insert_customer(&state.store, new_customer).await?;
    publish_snapshot(&state).await;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateCustomer>,
) -> Result<Json<Customer>, ApiError> {
    let customer = dal::update_customer(&state.store, id, changes).await?;
    publish_snapshot(&state).await;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiMessage>, ApiError> {
    dal::delete_customer(&state.store, id).await?;
    publish_snapshot(&state).await;
    Ok(Json(ApiMessage::new("Customer deleted")))
}
