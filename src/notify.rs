//! Responsible for fanning fresh data out to connected clients

use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::customer::Customer;
use crate::model::order::Order;

/// Full state snapshot pushed after every successful mutation. Each
/// update carries everything, so a subscriber that misses one is caught
/// up by the next.
#[derive(Debug, Clone, Serialize)]
pub struct DataUpdate {
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
}

/// Observer interface the mutation handlers call after a write lands.
pub trait UpdateSink: Send + Sync {
    fn publish(&self, update: DataUpdate);
}

/// Broadcast channel fan-out behind [`UpdateSink`].
#[derive(Debug)]
pub struct UpdateBroadcaster {
    sender: broadcast::Sender<DataUpdate>,
}

impl UpdateBroadcaster {
    pub fn new(capacity: usize) -> UpdateBroadcaster {
        let (sender, _) = broadcast::channel(capacity);
        UpdateBroadcaster { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataUpdate> {
        self.sender.subscribe()
    }
}

impl UpdateSink for UpdateBroadcaster {
    fn publish(&self, update: DataUpdate) {
        // Err just means nobody is connected right now.
        _ = self.sender.send(update);
    }
}
