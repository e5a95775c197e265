//! In-memory example-data store.
//!
//! Demo business logic behind the authenticated CRUD tools. Items live in
//! per-user buckets; every operation takes the owning user's id, so a caller
//! can never see or touch another user's items.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::ItemId;

/// An example data item owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The item does not exist in the caller's bucket. Deliberately does not
    /// distinguish "unknown id" from "owned by someone else".
    NotFound,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Item not found or access denied"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Per-user example-data buckets.
#[derive(Default)]
pub struct ExampleStore {
    items: RwLock<HashMap<String, Vec<ExampleItem>>>,
}

impl ExampleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// List the given user's items, oldest first.
    pub async fn list(&self, user_id: &str) -> Vec<ExampleItem> {
        self.items
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Create a new item owned by the given user.
    pub async fn create(&self, user_id: &str, name: String, description: String) -> ExampleItem {
        let item = ExampleItem {
            id: ItemId::new(Uuid::new_v4().to_string()),
            name,
            description,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        self.items
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(item.clone());

        item
    }

    /// Apply a partial update to an item the given user owns.
    pub async fn update(
        &self,
        user_id: &str,
        id: &ItemId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<ExampleItem, StoreError> {
        let mut items = self.items.write().await;
        let bucket = items.get_mut(user_id).ok_or(StoreError::NotFound)?;
        let item = bucket
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = name {
            item.name = name;
        }
        if let Some(description) = description {
            item.description = description;
        }
        item.updated_at = Some(Utc::now());

        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_empty_for_unknown_user() {
        let store = ExampleStore::new();
        assert!(store.list("user_123").await.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = ExampleStore::new();
        let created = store
            .create("user_123", "Item".to_string(), "Desc".to_string())
            .await;

        let items = store.list("user_123").await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, created.id);
        assert_eq!(items[0].user_id, "user_123");
        assert!(items[0].updated_at.is_none());
    }

    #[tokio::test]
    async fn test_update_partial() {
        let store = ExampleStore::new();
        let created = store
            .create("user_123", "Old".to_string(), "Desc".to_string())
            .await;

        let updated = store
            .update("user_123", &created.id, Some("New".to_string()), None)
            .await
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.description, "Desc");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_foreign_item_denied() {
        let store = ExampleStore::new();
        let created = store
            .create("user_123", "Mine".to_string(), "Desc".to_string())
            .await;

        // Another user cannot reach the item, even with the right id.
        let err = store
            .update("user_456", &created.id, Some("Stolen".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
        assert_eq!(err.to_string(), "Item not found or access denied");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = ExampleStore::new();
        store
            .create("user_123", "Mine".to_string(), "Desc".to_string())
            .await;

        let err = store
            .update("user_123", &ItemId::new("missing"), None, None)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = ExampleStore::new();
        store
            .create("user_a", "A".to_string(), "a".to_string())
            .await;
        store
            .create("user_b", "B".to_string(), "b".to_string())
            .await;

        assert_eq!(store.list("user_a").await.len(), 1);
        assert_eq!(store.list("user_b").await.len(), 1);
        assert_eq!(store.list("user_a").await[0].name, "A");
    }

    #[tokio::test]
    async fn test_item_serializes_camel_case() {
        let store = ExampleStore::new();
        let item = store
            .create("user_123", "Item".to_string(), "Desc".to_string())
            .await;

        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());
        // updatedAt omitted until the first update
        assert!(value.get("updatedAt").is_none());
    }
}
