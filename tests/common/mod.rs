// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use splitledger::application::{ExpenseService, NewExpense};
use splitledger::domain::{Category, Expense};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    test_service_for("tester").await
}

/// Helper to create a test service for a specific user
pub async fn test_service_for(user: &str) -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ExpenseService::init(db_path.to_str().unwrap(), user).await?;
    Ok((service, temp_dir))
}

/// Build an expense input with the given payer and participants
pub fn new_expense(
    description: &str,
    amount: f64,
    category: Category,
    date: &str,
    paid_by: &str,
    split: &[&str],
) -> NewExpense {
    NewExpense {
        id: None,
        description: description.to_string(),
        amount,
        category,
        date: date.to_string(),
        paid_by: paid_by.to_string(),
        split_between: split.iter().map(|s| s.to_string()).collect(),
    }
}

/// Test fixture: a weekend trip shared by three friends
pub struct TripExpenses;

impl TripExpenses {
    /// Alice pays dinner for three, Bob pays the train for two, Carol buys groceries for all
    pub async fn record(service: &ExpenseService) -> Result<Vec<Expense>> {
        let mut recorded = Vec::new();
        recorded.push(
            service
                .add_expense(new_expense(
                    "Dinner",
                    300.0,
                    Category::Food,
                    "2024-03-01",
                    "Alice",
                    &["Alice", "Bob", "Carol"],
                ))
                .await?,
        );
        recorded.push(
            service
                .add_expense(new_expense(
                    "Train tickets",
                    120.0,
                    Category::Travel,
                    "2024-03-02",
                    "Bob",
                    &["Alice", "Bob"],
                ))
                .await?,
        );
        recorded.push(
            service
                .add_expense(new_expense(
                    "Groceries",
                    90.0,
                    Category::Food,
                    "2024-03-03",
                    "Carol",
                    &["Alice", "Bob", "Carol"],
                ))
                .await?,
        );
        Ok(recorded)
    }
}

/// Assert two amounts are equal within floating-point tolerance
pub fn assert_amount(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
