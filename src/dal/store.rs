//! Responsible for loading and saving the single JSON data file

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::model::customer::Customer;
use crate::model::order::Order;

/// Everything the application persists, in one document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("error writing the data file")]
    Io(#[from] std::io::Error),

    #[error("error serializing the data file")]
    Serialize(#[from] serde_json::Error),
}

/// JSON file backed store. Whole-file last write wins, single writer
/// assumed; every mutation rewrites the document.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl Store {
    /// Opens the store, falling back to empty collections when the file
    /// is missing or unreadable. The first mutation recreates it.
    pub async fn open(path: impl Into<PathBuf>) -> Store {
        let path = path.into();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoreData>(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    error!("error parsing data file {}: {e}", path.display());
                    StoreData::default()
                }
            },
            Err(e) => {
                info!("no data file at {} ({e}), starting empty", path.display());
                StoreData::default()
            }
        };

        Store {
            path,
            data: RwLock::new(data),
        }
    }

    /// A full copy of the current state. Callers sequence and report
    /// over the copy, never over the live collections.
    pub async fn snapshot(&self) -> StoreData {
        self.data.read().await.clone()
    }

    /// Applies a mutation and persists the whole document while still
    /// holding the write lock. A failed mutation persists nothing.
    pub async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut StoreData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut data = self.data.write().await;
        let result = apply(&mut data)?;
        self.persist(&data).await?;
        Ok(result)
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::NewOrder;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("magicsell_{name}_{}.json", std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let store = Store::open(temp_path("missing")).await;
        let data = store.snapshot().await;
        assert!(data.orders.is_empty());
        assert!(data.customers.is_empty());
    }

    #[tokio::test]
    async fn mutations_survive_a_reopen() {
        let path = temp_path("reopen");
        tokio::fs::remove_file(&path).await.ok();

        let store = Store::open(&path).await;
        crate::dal::insert_order(
            &store,
            NewOrder {
                customer_name: "Smith Electronics".to_string(),
                customer_phone: None,
                customer_address: None,
                customer_postcode: Some("BH15 1AA".to_string()),
                total_amount: Some(42.0),
                status: Default::default(),
            },
        )
        .await
        .unwrap();

        let reopened = Store::open(&path).await;
        let data = reopened.snapshot().await;
        assert_eq!(data.orders.len(), 1);
        assert_eq!(data.orders[0].customer_name, "Smith Electronics");

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn failed_mutation_changes_nothing() {
        let path = temp_path("failed_mutation");
        tokio::fs::remove_file(&path).await.ok();

        let store = Store::open(&path).await;
        let result = store
            .mutate(|_| -> Result<(), StoreError> {
                Err(StoreError::NotFound {
                    entity: "Order",
                    id: 99,
                })
            })
            .await;

        assert!(result.is_err());
        assert!(tokio::fs::metadata(&path).await.is_err());
    }
}
