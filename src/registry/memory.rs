//! In-memory item registry
//!
//! Holds item snapshots keyed by name, records every fetch and command, and
//! can be told to fail specific operations.

use super::traits::ItemRegistry;
use async_trait::async_trait;
use intent_bridge_shared::{Item, RemoteError};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// A command received by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub item_name: String,
    pub value: String,
}

/// Registry backed by a map of item snapshots
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    items: RwLock<HashMap<String, Item>>,
    fetches: RwLock<Vec<String>>,
    commands: RwLock<Vec<SentCommand>>,
    fetch_failures: RwLock<HashMap<String, RemoteError>>,
    send_failures: RwLock<HashMap<String, RemoteError>>,
    /// Commands leave item states untouched, as a backend that ignores them
    frozen: bool,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with top-level items
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.name.clone(), item))
            .collect();
        Self {
            items: RwLock::new(items),
            ..Default::default()
        }
    }

    /// Stop applying received commands to stored states
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Add or replace a top-level item
    pub async fn insert(&self, item: Item) {
        self.items.write().await.insert(item.name.clone(), item);
    }

    /// Make every fetch of `id` fail
    pub async fn fail_fetch(&self, id: impl Into<String>, error: RemoteError) {
        self.fetch_failures.write().await.insert(id.into(), error);
    }

    /// Make every command sent to `item_name` fail
    pub async fn fail_send(&self, item_name: impl Into<String>, error: RemoteError) {
        self.send_failures.write().await.insert(item_name.into(), error);
    }

    /// Ids fetched so far, in call order
    pub async fn fetched(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }

    /// Commands accepted so far, in call order
    pub async fn sent(&self) -> Vec<SentCommand> {
        self.commands.read().await.clone()
    }

    pub async fn fetch_count(&self, id: &str) -> usize {
        self.fetches.read().await.iter().filter(|f| *f == id).count()
    }

    pub async fn send_count(&self, item_name: &str) -> usize {
        self.commands
            .read()
            .await
            .iter()
            .filter(|c| c.item_name == item_name)
            .count()
    }

    /// Current snapshot of an item, looked up among members too
    pub async fn item(&self, name: &str) -> Option<Item> {
        let items = self.items.read().await;
        items.values().find_map(|item| find(item, name)).cloned()
    }
}

#[async_trait]
impl ItemRegistry for MemoryRegistry {
    async fn fetch_item(&self, id: &str) -> Result<Item, RemoteError> {
        self.fetches.write().await.push(id.to_string());

        if let Some(err) = self.fetch_failures.read().await.get(id) {
            return Err(err.clone());
        }

        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(id))
    }

    async fn send_command(&self, item_name: &str, value: &str) -> Result<(), RemoteError> {
        if let Some(err) = self.send_failures.read().await.get(item_name) {
            return Err(err.clone());
        }

        self.commands.write().await.push(SentCommand {
            item_name: item_name.to_string(),
            value: value.to_string(),
        });

        if !self.frozen {
            let mut items = self.items.write().await;
            match items.values_mut().find_map(|item| find_mut(item, item_name)) {
                Some(target) => {
                    debug!("[REGISTRY] {} state {} -> {}", item_name, target.state, value);
                    target.state = value.to_string();
                }
                None => debug!("[REGISTRY] {} is not stored, state not tracked", item_name),
            }
        }

        Ok(())
    }
}

fn find<'a>(item: &'a Item, name: &str) -> Option<&'a Item> {
    if item.name == name {
        return Some(item);
    }
    item.members.iter().find_map(|member| find(member, name))
}

fn find_mut<'a>(item: &'a mut Item, name: &str) -> Option<&'a mut Item> {
    if item.name == name {
        return Some(item);
    }
    item.members
        .iter_mut()
        .find_map(|member| find_mut(member, name))
}
