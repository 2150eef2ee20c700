use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{Category, Expense};

use super::MIGRATION_001_INITIAL;

const EXPENSE_COLUMNS: &str =
    "id, description, amount, category, date, paid_by, split_between, per_person_share, created_at";

/// Repository for persisting expenses. Every collection is keyed by an opaque user id.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
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

    /// Append an expense to a user's collection.
    pub async fn save_expense(&self, user_id: &str, expense: &Expense) -> Result<()> {
        let split_json = serde_json::to_string(&expense.split_between)?;

        sqlx::query(
            r#"
            INSERT INTO expenses (user_id, id, description, amount, category, date, paid_by, split_between, per_person_share, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.category.as_str())
        .bind(&expense.date)
        .bind(&expense.paid_by)
        .bind(&split_json)
        .bind(expense.per_person_share)
        .bind(expense.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;

        Ok(())
    }

    /// Get an expense by ID.
    pub async fn get_expense(&self, user_id: &str, id: &str) -> Result<Option<Expense>> {
        let query = format!(
            "SELECT {} FROM expenses WHERE user_id = ? AND id = ?",
            EXPENSE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    /// List a user's expenses in the order they were recorded.
    pub async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        let query = format!(
            "SELECT {} FROM expenses WHERE user_id = ? ORDER BY sequence",
            EXPENSE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Count a user's expenses.
    pub async fn count_expenses(&self, user_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM expenses WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count expenses")?;

        Ok(row.get("count"))
    }

    /// Delete every expense belonging to a user. Returns how many were removed.
    pub async fn clear_expenses(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear expenses")?;

        Ok(result.rows_affected())
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let category_str: String = row.get("category");
        let split_json: String = row.get("split_between");
        let created_at_str: String = row.get("created_at");

        Ok(Expense {
            id: row.get("id"),
            description: row.get("description"),
            amount: row.get("amount"),
            category: category_str
                .parse::<Category>()
                .map_err(|e| anyhow::anyhow!("Invalid category: {}", e))?,
            date: row.get("date"),
            paid_by: row.get("paid_by"),
            split_between: serde_json::from_str(&split_json)
                .context("Invalid split_between list")?,
            per_person_share: row.get("per_person_share"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
