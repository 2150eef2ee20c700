use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Amount, Category, Expense};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
}

/// Amount a single person fronted. Shares owed are not part of this view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonTotal {
    pub person: String,
    pub total: Amount,
}

/// Sum expense amounts per category, in the order categories first appear.
/// Categories without expenses are left out.
pub fn totals_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<Category, usize> = HashMap::new();

    for expense in expenses {
        let slot = *index.entry(expense.category).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: expense.category,
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].total += expense.amount;
    }

    totals
}

/// Sum expense amounts per payer, in the order payers first appear.
pub fn totals_by_person(expenses: &[Expense]) -> Vec<PersonTotal> {
    let mut totals: Vec<PersonTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        let slot = *index.entry(&expense.paid_by).or_insert_with(|| {
            totals.push(PersonTotal {
                person: expense.paid_by.clone(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].total += expense.amount;
    }

    totals
}

/// Grand total of all expense amounts.
pub fn total_spent(expenses: &[Expense]) -> Amount {
    expenses.iter().map(|expense| expense.amount).sum()
}
