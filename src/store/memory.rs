use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::category::now;
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::store::{not_found, CategoryStore};

#[derive(Debug, Default)]
struct Table {
    /// Last id handed out; ids are never reused.
    last_id: i32,
    rows: BTreeMap<i32, Category>,
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    table: RwLock<Table>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> AppResult<Category> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, new: NewCategory) -> AppResult<Category> {
        new.check()?;

        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| AppError::Internal("category id space exhausted".into()))?;
        table.last_id = id;
        let at = now();
        let category = Category {
            id,
            name: new.name,
            description: new.description,
            created_at: at,
            updated_at: at,
        };
        table.rows.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> AppResult<Category> {
        changes.check()?;

        let mut table = self.table.write().await;
        let category = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        changes.apply(category, now());
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn electronics() -> NewCategory {
        NewCategory {
            name: "Electronics".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_sets_equal_timestamps_and_assigns_ids() {
        let store = MemoryCategoryStore::new();
        let first = store.create(electronics()).await.unwrap();
        let second = store
            .create(NewCategory {
                name: "Books".to_string(),
                description: Some("Paper and ebooks".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn update_strictly_advances_updated_at() {
        let store = MemoryCategoryStore::new();
        let created = store.create(electronics()).await.unwrap();

        let once = store
            .update(
                created.id,
                CategoryChanges {
                    name: Some("Electronics & Audio".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let twice = store
            .update(
                created.id,
                CategoryChanges {
                    description: Some(Some("Now with speakers".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(once.updated_at > created.updated_at);
        assert!(twice.updated_at > once.updated_at);
        assert_eq!(twice.created_at, created.created_at);
        assert_eq!(twice.id, created.id);
        assert_eq!(twice.name, "Electronics & Audio");
    }

    #[tokio::test]
    async fn overlong_name_is_rejected_and_nothing_written() {
        let store = MemoryCategoryStore::new();
        let err = store
            .create(NewCategory {
                name: "x".repeat(51),
                description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Constraint(ref v) if v.column == "name"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_leaves_row_untouched() {
        let store = MemoryCategoryStore::new();
        let created = store.create(electronics()).await.unwrap();

        let err = store
            .update(
                created.id,
                CategoryChanges {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Constraint(_)));
        assert_eq!(store.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryCategoryStore::new();
        assert!(matches!(store.get(7).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update(7, CategoryChanges::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(store.delete(7).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryCategoryStore::new();
        let first = store.create(electronics()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(electronics()).await.unwrap();

        assert_ne!(first.id, second.id);
        let ids: Vec<i32> = store.list().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id]);
    }

    #[tokio::test]
    async fn exhausted_id_space_is_an_error_not_a_panic() {
        let store = MemoryCategoryStore::new();
        store.table.write().await.last_id = i32::MAX;

        let err = store.create(electronics()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.table.read().await.last_id, i32::MAX);
    }
}
