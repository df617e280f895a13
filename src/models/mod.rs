pub mod category;
pub mod schema;

pub use category::{Category, CategoryChanges, NewCategory, CATEGORIES};
pub use schema::{ConstraintViolation, Entity, TableSchema};
