use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::{Batch, BatchId, NewBatch};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying stock batches.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Insert a new batch and return it with its store-assigned id.
    pub async fn insert(&self, batch: &NewBatch) -> Result<Batch> {
        let row = sqlx::query(
            r#"
            INSERT INTO batches (color, cotton_part, quantity)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&batch.color)
        .bind(batch.cotton_part)
        .bind(batch.quantity)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert batch")?;

        Ok(Batch {
            id: row.get("id"),
            color: batch.color.clone(),
            cotton_part: batch.cotton_part,
            quantity: batch.quantity,
        })
    }

    /// Overwrite an existing batch's fields by id.
    pub async fn update(&self, batch: &Batch) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE batches
            SET color = ?, cotton_part = ?, quantity = ?
            WHERE id = ?
            "#,
        )
        .bind(&batch.color)
        .bind(batch.cotton_part)
        .bind(batch.quantity)
        .bind(batch.id)
        .execute(&self.pool)
        .await
        .context("Failed to update batch")?;

        Ok(())
    }

    /// Insert a set of batches within a single transaction.
    /// Either every row lands or none do.
    pub async fn insert_all(&self, batches: &[NewBatch]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for batch in batches {
            sqlx::query(
                r#"
                INSERT INTO batches (color, cotton_part, quantity)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&batch.color)
            .bind(batch.cotton_part)
            .bind(batch.quantity)
            .execute(&mut *tx)
            .await
            .context("Failed to insert batch")?;
        }

        tx.commit().await.context("Failed to commit batch insert")?;

        Ok(batches.len() as u64)
    }

    /// Look up a batch by its natural key.
    pub async fn find_by_key(&self, color: &str, cotton_part: i64) -> Result<Option<Batch>> {
        let row = sqlx::query(
            r#"
            SELECT id, color, cotton_part, quantity
            FROM batches
            WHERE color = ? AND cotton_part = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(color)
        .bind(cotton_part)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch batch by key")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_batch(&row)?)),
            None => Ok(None),
        }
    }

    /// Look up a batch by id.
    pub async fn find_by_id(&self, id: BatchId) -> Result<Option<Batch>> {
        let row = sqlx::query(
            r#"
            SELECT id, color, cotton_part, quantity
            FROM batches
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch batch by id")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_batch(&row)?)),
            None => Ok(None),
        }
    }

    /// List batches matching the supplied filters, in id order.
    pub async fn list_filtered(
        &self,
        color: Option<&str>,
        min_cotton: Option<i64>,
        max_cotton: Option<i64>,
    ) -> Result<Vec<Batch>> {
        // Build query dynamically based on filters
        let mut query =
            String::from("SELECT id, color, cotton_part, quantity FROM batches WHERE 1=1");

        if color.is_some() {
            query.push_str(" AND color = ?");
        }
        if min_cotton.is_some() {
            query.push_str(" AND cotton_part >= ?");
        }
        if max_cotton.is_some() {
            query.push_str(" AND cotton_part <= ?");
        }

        query.push_str(" ORDER BY id");

        let mut sql_query = sqlx::query(&query);

        if let Some(c) = color {
            sql_query = sql_query.bind(c);
        }
        if let Some(min) = min_cotton {
            sql_query = sql_query.bind(min);
        }
        if let Some(max) = max_cotton {
            sql_query = sql_query.bind(max);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list batches")?;

        rows.iter().map(Self::row_to_batch).collect()
    }

    fn row_to_batch(row: &sqlx::sqlite::SqliteRow) -> Result<Batch> {
        Ok(Batch {
            id: row.get("id"),
            color: row.get("color"),
            cotton_part: row.get("cotton_part"),
            quantity: row.get("quantity"),
        })
    }
}
