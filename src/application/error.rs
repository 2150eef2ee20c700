use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Expense already exists: {0}")]
    DuplicateExpense(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
