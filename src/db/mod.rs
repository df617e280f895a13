use async_trait::async_trait;
use sqlx::postgres::{PgDatabaseError, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::category::now;
use crate::models::schema::{ConstraintViolation, Entity, ViolationKind};
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::store::{not_found, CategoryStore};

const CATEGORY_COLUMNS: &str =
    "id, name, description, created_at, COALESCE(updated_at, created_at) AS updated_at";

/// Opens the pool and applies pending migrations.
pub async fn connect(config: &Config, database_url: &str) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    info!("Database connection pool established.");

    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    Ok(pool)
}

/// The violation a PostgreSQL error code stands for, if it is one of the
/// constraint failures the categories table can raise.
pub(crate) fn constraint_for(
    code: Option<&str>,
    column: Option<&str>,
) -> Option<ConstraintViolation> {
    let code: &'static str = match code? {
        "22001" => "22001",
        "23502" => "23502",
        "23514" => "23514",
        _ => return None,
    };

    let column = column
        .and_then(|name| Category::SCHEMA.column(name))
        .map(|c| c.name)
        .unwrap_or(Category::SCHEMA.name);

    Some(ConstraintViolation::new(
        column,
        ViolationKind::Rejected { code },
    ))
}

/// Maps PostgreSQL constraint failures onto [`AppError::Constraint`].
fn translate(err: sqlx::Error) -> AppError {
    let violation = err.as_database_error().and_then(|db| {
        let column = db
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| pg.column());
        constraint_for(db.code().as_deref(), column)
    });

    match violation {
        Some(violation) => AppError::Constraint(violation),
        None => AppError::Database(err),
    }
}

pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY id ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn create(&self, new: NewCategory) -> AppResult<Category> {
        new.check()?;

        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(now())
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> AppResult<Category> {
        changes.check()?;

        // GREATEST keeps updated_at strictly increasing when the clock has not moved.
        sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name        = COALESCE($1::text, name),
                description = CASE WHEN $2 THEN $3::text ELSE description END,
                updated_at  = GREATEST($4, COALESCE(updated_at, created_at) + INTERVAL '1 microsecond')
            WHERE id = $5
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(changes.name.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)?
        .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
