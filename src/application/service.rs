use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    Amount, Balance, Category, CategoryTotal, Expense, ExpenseFilter, PersonTotal,
    compute_balances, people, total_spent, totals_by_category, totals_by_person,
};
use crate::storage::Repository;

use super::{AppError, ExpenseSummary};

/// User used when the caller does not name one.
pub const DEFAULT_USER: &str = "default";

/// Application service providing high-level operations for one user's expenses.
/// This is the primary interface for any client (CLI, import, tests).
pub struct ExpenseService {
    repo: Repository,
    user_id: String,
}

/// Input for recording an expense, before validation.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Caller-assigned id; a fresh one is generated when absent
    pub id: Option<String>,
    pub description: String,
    pub amount: Amount,
    pub category: Category,
    pub date: String,
    pub paid_by: String,
    pub split_between: Vec<String>,
}

impl ExpenseService {
    /// Create a new expense service with the given repository.
    pub fn new(repo: Repository, user_id: impl Into<String>) -> Self {
        Self {
            repo,
            user_id: user_id.into(),
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str, user_id: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        info!(database = database_path, "initialized expense database");
        Ok(Self::new(repo, user_id))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, user_id: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        debug!(database = database_path, user = user_id, "connected");
        Ok(Self::new(repo, user_id))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ========================
    // Expense operations
    // ========================

    /// Validate and record a new expense.
    pub async fn add_expense(&self, input: NewExpense) -> Result<Expense, AppError> {
        let expense = self.prepare_expense(input).await?;

        self.repo.save_expense(&self.user_id, &expense).await?;
        info!(
            id = %expense.id,
            amount = expense.amount,
            paid_by = %expense.paid_by,
            participants = expense.split_between.len(),
            "recorded expense"
        );
        Ok(expense)
    }

    /// Validate an expense and build the record `add_expense` would store,
    /// without writing anything.
    pub async fn prepare_expense(&self, input: NewExpense) -> Result<Expense, AppError> {
        let NewExpense {
            id,
            description,
            amount,
            category,
            date,
            paid_by,
            split_between,
        } = input;

        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::InvalidExpense(
                "Description is required".to_string(),
            ));
        }

        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let date = date.trim().to_string();
        NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(date.clone()))?;

        let paid_by = paid_by.trim().to_string();
        if paid_by.is_empty() {
            return Err(AppError::InvalidExpense("Payer is required".to_string()));
        }
        check_name(&paid_by)?;

        let split_between = normalize_split(split_between)?;

        let mut expense = Expense::new(
            description,
            amount,
            category,
            date,
            paid_by,
            split_between,
        );

        if let Some(id) = id {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(AppError::InvalidExpense("Expense id is empty".to_string()));
            }
            if self.repo.get_expense(&self.user_id, &id).await?.is_some() {
                return Err(AppError::DuplicateExpense(id));
            }
            expense = expense.with_id(id);
        }

        Ok(expense)
    }

    /// Store a previously exported expense as-is, keeping its id, creation
    /// time and frozen share.
    pub async fn restore_expense(&self, expense: Expense) -> Result<Expense, AppError> {
        let expense = self.prepare_restore(expense).await?;

        self.repo.save_expense(&self.user_id, &expense).await?;
        debug!(id = %expense.id, created_at = %expense.created_at, "restored expense");
        Ok(expense)
    }

    /// Run the `add_expense` checks on a stored record without writing it.
    pub async fn prepare_restore(&self, expense: Expense) -> Result<Expense, AppError> {
        let share = expense.per_person_share;
        if !share.is_finite() || share < 0.0 {
            return Err(AppError::InvalidAmount(format!(
                "Per person share {} is not valid",
                share
            )));
        }
        let created_at = expense.created_at;

        let checked = self
            .prepare_expense(NewExpense {
                id: Some(expense.id),
                description: expense.description,
                amount: expense.amount,
                category: expense.category,
                date: expense.date,
                paid_by: expense.paid_by,
                split_between: expense.split_between,
            })
            .await?;

        Ok(Expense {
            per_person_share: share,
            created_at,
            ..checked
        })
    }

    /// Get an expense by ID.
    pub async fn get_expense(&self, id: &str) -> Result<Expense, AppError> {
        self.repo
            .get_expense(&self.user_id, id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))
    }

    /// List the expenses matching `filter`, oldest first.
    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, AppError> {
        let expenses = self.repo.list_expenses(&self.user_id).await?;
        let matched = filter.apply(&expenses);
        debug!(
            total = expenses.len(),
            matched = matched.len(),
            "filtered expenses"
        );
        Ok(matched)
    }

    pub async fn count_expenses(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_expenses(&self.user_id).await?)
    }

    /// Everyone who appears in any expense, regardless of filters.
    pub async fn people(&self) -> Result<Vec<String>, AppError> {
        let expenses = self.repo.list_expenses(&self.user_id).await?;
        Ok(people(&expenses))
    }

    /// Remove all of this user's expenses.
    pub async fn clear_all(&self) -> Result<u64, AppError> {
        let removed = self.repo.clear_expenses(&self.user_id).await?;
        info!(user = %self.user_id, removed, "cleared expenses");
        Ok(removed)
    }

    // ========================
    // Reporting
    // ========================

    /// Per-person balances over the filtered expenses.
    pub async fn balances(&self, filter: &ExpenseFilter) -> Result<Vec<Balance>, AppError> {
        let expenses = self.list_expenses(filter).await?;
        Ok(compute_balances(&expenses))
    }

    pub async fn category_totals(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let expenses = self.list_expenses(filter).await?;
        Ok(totals_by_category(&expenses))
    }

    pub async fn person_totals(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<Vec<PersonTotal>, AppError> {
        let expenses = self.list_expenses(filter).await?;
        Ok(totals_by_person(&expenses))
    }

    /// Balances and both totals computed over a single filtered snapshot.
    pub async fn summary(&self, filter: &ExpenseFilter) -> Result<ExpenseSummary, AppError> {
        let expenses = self.list_expenses(filter).await?;

        Ok(ExpenseSummary {
            filter: filter.clone(),
            expense_count: expenses.len(),
            total_spent: total_spent(&expenses),
            balances: compute_balances(&expenses),
            by_category: totals_by_category(&expenses),
            by_person: totals_by_person(&expenses),
        })
    }
}

/// Names are joined with commas in the tabular export, so they cannot hold one.
fn check_name(name: &str) -> Result<(), AppError> {
    if name.contains(',') {
        return Err(AppError::InvalidExpense(format!(
            "'{}' cannot contain a comma",
            name
        )));
    }
    Ok(())
}

/// Trim participant names and reject blank or repeated ones.
fn normalize_split(split_between: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut names: Vec<String> = Vec::with_capacity(split_between.len());
    for name in split_between {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidExpense(
                "Participant names cannot be empty".to_string(),
            ));
        }
        check_name(&name)?;
        if names.contains(&name) {
            return Err(AppError::InvalidExpense(format!(
                "'{}' appears more than once in the split",
                name
            )));
        }
        names.push(name);
    }

    if names.is_empty() {
        return Err(AppError::InvalidExpense(
            "An expense must be split between at least one person".to_string(),
        ));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_split_trims() {
        let split = normalize_split(names(&[" Alice ", "Bob"])).unwrap();
        assert_eq!(split, names(&["Alice", "Bob"]));
    }

    #[test]
    fn test_normalize_split_rejects_duplicates() {
        let result = normalize_split(names(&["Alice", "Alice "]));
        assert!(matches!(result, Err(AppError::InvalidExpense(_))));
    }

    #[test]
    fn test_normalize_split_rejects_commas() {
        let result = normalize_split(names(&["Smith, J", "Bob"]));
        assert!(matches!(result, Err(AppError::InvalidExpense(_))));
    }

    #[test]
    fn test_normalize_split_rejects_empty() {
        assert!(matches!(
            normalize_split(vec![]),
            Err(AppError::InvalidExpense(_))
        ));
        assert!(matches!(
            normalize_split(names(&["Alice", "  "])),
            Err(AppError::InvalidExpense(_))
        ));
    }
}
