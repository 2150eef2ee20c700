use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{AMOUNT_EPSILON, Amount, Expense};

/// A person's position across a set of expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub person: String,
    /// Sum of amounts this person fronted
    pub total_paid: Amount,
    /// Sum of per-person shares this person is part of
    pub total_owed: Amount,
    /// `total_paid - total_owed`; positive means the group owes them
    pub net_balance: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    /// Should receive money from the group
    Owed,
    /// Should pay money to the group
    Owes,
    Settled,
}

impl BalanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStatus::Owed => "gets back",
            BalanceStatus::Owes => "owes",
            BalanceStatus::Settled => "settled",
        }
    }
}

impl Balance {
    fn new(person: &str) -> Self {
        Self {
            person: person.to_string(),
            total_paid: 0.0,
            total_owed: 0.0,
            net_balance: 0.0,
        }
    }

    pub fn status(&self) -> BalanceStatus {
        if self.net_balance > AMOUNT_EPSILON {
            BalanceStatus::Owed
        } else if self.net_balance < -AMOUNT_EPSILON {
            BalanceStatus::Owes
        } else {
            BalanceStatus::Settled
        }
    }
}

/// Compute one balance per person seen as payer or participant.
///
/// Shares are taken from `Expense::per_person_share` as stored. The result is
/// ordered by net balance, highest first; equal balances keep the order in
/// which the people first appeared.
pub fn compute_balances(expenses: &[Expense]) -> Vec<Balance> {
    let mut balances: Vec<Balance> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        let payer = slot(&mut balances, &mut index, &expense.paid_by);
        balances[payer].total_paid += expense.amount;

        for person in &expense.split_between {
            let participant = slot(&mut balances, &mut index, person);
            balances[participant].total_owed += expense.per_person_share;
        }
    }

    for balance in &mut balances {
        balance.net_balance = balance.total_paid - balance.total_owed;
    }

    // Stable sort: ties stay in first-seen order
    balances.sort_by(|a, b| b.net_balance.total_cmp(&a.net_balance));
    balances
}

/// Position of `person` in `balances`, adding a zeroed entry on first sight.
fn slot<'a>(
    balances: &mut Vec<Balance>,
    index: &mut HashMap<&'a str, usize>,
    person: &'a str,
) -> usize {
    *index.entry(person).or_insert_with(|| {
        balances.push(Balance::new(person));
        balances.len() - 1
    })
}

/// All distinct people across payers and participants, sorted by name.
pub fn people(expenses: &[Expense]) -> Vec<String> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for expense in expenses {
        names.insert(&expense.paid_by);
        names.extend(expense.split_between.iter().map(String::as_str));
    }
    names.into_iter().map(str::to_string).collect()
}
