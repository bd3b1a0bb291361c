//! Registry trait abstraction for pluggable item backends

use async_trait::async_trait;
use intent_bridge_shared::{Item, RemoteError};

/// Remote home-automation item registry
#[async_trait]
pub trait ItemRegistry: Send + Sync {
    /// Fetch the current snapshot of an item, members included
    async fn fetch_item(&self, id: &str) -> Result<Item, RemoteError>;

    /// Send a command value to an addressable item
    async fn send_command(&self, item_name: &str, value: &str) -> Result<(), RemoteError>;
}
