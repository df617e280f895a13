use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Category, CategoryChanges, NewCategory};

pub mod memory;

pub use memory::MemoryCategoryStore;

/// Persistence for [`Category`] records.
///
/// Implementations check writes against [`crate::models::CATEGORIES`] and
/// own the timestamp rules: `created_at == updated_at` on insert, and a
/// strictly later `updated_at` on every update.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories, ordered by id.
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn get(&self, id: i32) -> AppResult<Category>;

    async fn create(&self, new: NewCategory) -> AppResult<Category>;

    async fn update(&self, id: i32, changes: CategoryChanges) -> AppResult<Category>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub(crate) fn not_found(id: i32) -> crate::error::AppError {
    crate::error::AppError::NotFound(format!("Category {} not found", id))
}
