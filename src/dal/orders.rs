use chrono::Utc;

use crate::dal::store::{Store, StoreError};
use crate::model::order::{NewOrder, Order, OrderStatus, UpdateOrder};

pub async fn get_orders(store: &Store) -> Vec<Order> {
    store.snapshot().await.orders
}

/// Returns the saved order. The id, basket number and delivery number
/// are positional, one past the current count.
pub async fn insert_order(store: &Store, new_order: NewOrder) -> Result<Order, StoreError> {
    store
        .mutate(move |data| {
            let id = data.orders.len() as i64 + 1;
            let order = Order {
                id,
                basket_no: id,
                delivery_no: format!("D{id:03}"),
                customer_name: new_order.customer_name,
                customer_phone: new_order.customer_phone,
                customer_address: new_order.customer_address,
                customer_postcode: new_order.customer_postcode,
                total_amount: new_order.total_amount,
                status: new_order.status,
                delivery_notes: String::new(),
                delivered_at: None,
            };
            data.orders.push(order.clone());
            Ok(order)
        })
        .await
}

/// Partial update. A transition to `Delivered` without an explicit
/// delivery time is stamped with the current time.
pub async fn update_order(
    store: &Store,
    id: i64,
    changes: UpdateOrder,
) -> Result<Order, StoreError> {
    store
        .mutate(move |data| {
            let order = data
                .orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(StoreError::NotFound { entity: "Order", id })?;

            if let Some(customer_name) = changes.customer_name {
                order.customer_name = customer_name;
            }
            if changes.customer_phone.is_some() {
                order.customer_phone = changes.customer_phone;
            }
            if changes.customer_address.is_some() {
                order.customer_address = changes.customer_address;
            }
            if changes.customer_postcode.is_some() {
                order.customer_postcode = changes.customer_postcode;
            }
            if changes.total_amount.is_some() {
                order.total_amount = changes.total_amount;
            }
            if let Some(delivery_notes) = changes.delivery_notes {
                order.delivery_notes = delivery_notes;
            }
            if changes.delivered_at.is_some() {
                order.delivered_at = changes.delivered_at;
            }
            if let Some(status) = changes.status {
                order.status = status;
                if status == OrderStatus::Delivered && order.delivered_at.is_none() {
                    order.delivered_at = Some(Utc::now());
                }
            }

            Ok(order.clone())
        })
        .await
}

pub async fn delete_order(store: &Store, id: i64) -> Result<(), StoreError> {
    store
        .mutate(move |data| {
            let index = data
                .orders
                .iter()
                .position(|o| o.id == id)
                .ok_or(StoreError::NotFound { entity: "Order", id })?;
            data.orders.remove(index);
            Ok(())
        })
        .await
}
