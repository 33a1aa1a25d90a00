use crate::dal::store::{Store, StoreError};
use crate::model::customer::{Customer, NewCustomer, UpdateCustomer};

pub async fn get_customers(store: &Store) -> Vec<Customer> {
    store.snapshot().await.customers
}

pub async fn insert_customer(
    store: &Store,
    new_customer: NewCustomer,
) -> Result<Customer, StoreError> {
    store
        .mutate(move |data| {
            let customer = Customer {
                id: data.customers.len() as i64 + 1,
                name: new_customer.name,
                shop_name: new_customer.shop_name,
                phone: new_customer.phone,
                email: new_customer.email,
                address: new_customer.address,
                city: new_customer.city,
                postcode: new_customer.postcode,
            };
            data.customers.push(customer.clone());
            Ok(customer)
        })
        .await
}

pub async fn update_customer(
    store: &Store,
    id: i64,
    changes: UpdateCustomer,
) -> Result<Customer, StoreError> {
    store
        .mutate(move |data| {
            let customer = data
                .customers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(StoreError::NotFound {
                    entity: "Customer",
                    id,
                })?;

            if let Some(name) = changes.name {
                customer.name = name;
            }
            if changes.shop_name.is_some() {
                customer.shop_name = changes.shop_name;
            }
            if changes.phone.is_some() {
                customer.phone = changes.phone;
            }
            if changes.email.is_some() {
                customer.email = changes.email;
            }
            if changes.address.is_some() {
                customer.address = changes.address;
            }
            if changes.city.is_some() {
                customer.city = changes.city;
            }
            if changes.postcode.is_some() {
                customer.postcode = changes.postcode;
            }

            Ok(customer.clone())
        })
        .await
}

pub async fn delete_customer(store: &Store, id: i64) -> Result<(), StoreError> {
    store
        .mutate(move |data| {
            let index = data
                .customers
                .iter()
                .position(|c| c.id == id)
                .ok_or(StoreError::NotFound {
                    entity: "Customer",
                    id,
                })?;
            data.customers.remove(index);
            Ok(())
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn empty_store(name: &str) -> (Store, std::path::PathBuf) {
        let path =
            std::env::temp_dir().join(format!("magicsell_{name}_{}.json", std::process::id()));
        tokio::fs::remove_file(&path).await.ok();
        (Store::open(&path).await, path)
    }

    #[tokio::test]
    async fn customers_get_sequential_ids() {
        let (store, path) = empty_store("customers_insert").await;

        let customer = insert_customer(
            &store,
            NewCustomer {
                name: "John Smith".to_string(),
                shop_name: Some("Smith Electronics".to_string()),
                phone: Some("+44 123 456 7890".to_string()),
                email: None,
                address: Some("123 High Street".to_string()),
                city: Some("Poole".to_string()),
                postcode: Some("BH15 1AA".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(customer.id, 1);
        assert_eq!(get_customers(&store).await.len(), 1);

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (store, path) = empty_store("customers_update").await;
        insert_customer(
            &store,
            NewCustomer {
                name: "John Smith".to_string(),
                shop_name: Some("Smith Electronics".to_string()),
                phone: None,
                email: None,
                address: None,
                city: None,
                postcode: None,
            },
        )
        .await
        .unwrap();

        let updated = update_customer(
            &store,
            1,
            UpdateCustomer {
                phone: Some("+44 987 654 3210".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "John Smith");
        assert_eq!(updated.shop_name.as_deref(), Some("Smith Electronics"));
        assert_eq!(updated.phone.as_deref(), Some("+44 987 654 3210"));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let (store, path) = empty_store("customers_missing").await;

        let result = delete_customer(&store, 3).await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "Customer",
                id: 3
            })
        ));

        tokio::fs::remove_file(&path).await.ok();
    }
}
