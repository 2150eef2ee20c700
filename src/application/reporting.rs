use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Balance, CategoryTotal, ExpenseFilter, PersonTotal};

/// Everything the dashboard shows for one filtered view of the expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub filter: ExpenseFilter,
    pub expense_count: usize,
    pub total_spent: Amount,
    pub balances: Vec<Balance>,
    pub by_category: Vec<CategoryTotal>,
    pub by_person: Vec<PersonTotal>,
}

impl ExpenseSummary {
    /// Share of the total spent in each category, as a percentage.
    pub fn category_percentages(&self) -> Vec<(CategoryTotal, f64)> {
        self.by_category
            .iter()
            .map(|entry| {
                let percentage = if self.total_spent > 0.0 {
                    entry.total / self.total_spent * 100.0
                } else {
                    0.0
                };
                (entry.clone(), percentage)
            })
            .collect()
    }
}
