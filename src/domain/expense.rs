use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, per_person_share};

pub type ExpenseId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Utilities,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Utilities,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "travel" => Ok(Category::Travel),
            "shopping" => Ok(Category::Shopping),
            "utilities" => Ok(Category::Utilities),
            "other" => Ok(Category::Other),
            other => Err(format!(
                "unknown category '{}' (expected food, travel, shopping, utilities or other)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single shared cost: one person paid, a group splits it evenly.
/// Expenses are never edited once recorded; the only way to remove them is a bulk clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Opaque identifier, unique within one user's collection
    pub id: ExpenseId,
    pub description: String,
    /// Total cost (always positive)
    pub amount: Amount,
    pub category: Category,
    /// Calendar date as `YYYY-MM-DD`, compared lexically
    pub date: String,
    /// Who fronted the money
    pub paid_by: String,
    /// Everyone sharing the cost, possibly including the payer
    pub split_between: Vec<String>,
    /// `amount / split_between.len()`, frozen at creation time
    pub per_person_share: Amount,
    /// When the expense was recorded
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create an expense with a fresh id. The per-person share is derived here
    /// and never recomputed afterwards.
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        category: Category,
        date: impl Into<String>,
        paid_by: impl Into<String>,
        split_between: Vec<String>,
    ) -> Self {
        let per_person_share = per_person_share(amount, &split_between);
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            category,
            date: date.into(),
            paid_by: paid_by.into(),
            split_between,
            per_person_share,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns true if `person` paid for or shares this expense.
    pub fn involves(&self, person: &str) -> bool {
        self.paid_by == person || self.split_between.iter().any(|p| p == person)
    }
}
