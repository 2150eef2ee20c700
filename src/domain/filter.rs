use serde::{Deserialize, Serialize};

use super::{Category, Expense};

/// Inclusive date bounds as `YYYY-MM-DD` strings. An empty bound is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Dates compare as strings; ISO dates sort chronologically that way.
    pub fn contains(&self, date: &str) -> bool {
        if !self.start.is_empty() && date < self.start.as_str() {
            return false;
        }
        if !self.end.is_empty() && date > self.end.as_str() {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

/// Criteria used to narrow an expense list before aggregation.
/// The default filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub date_range: DateRange,
    pub category: CategoryFilter,
    /// Matches the payer or any split participant
    pub person: Option<String>,
}

impl ExpenseFilter {
    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date_range = DateRange::new(start, end);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.person = Some(person.into());
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.date_range.contains(&expense.date) {
            return false;
        }
        if !self.category.matches(expense.category) {
            return false;
        }
        match self.person.as_deref() {
            Some(person) if !person.is_empty() => expense.involves(person),
            _ => true,
        }
    }

    /// Select the matching expenses, keeping their original order.
    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses
            .iter()
            .filter(|expense| self.matches(expense))
            .cloned()
            .collect()
    }
}
