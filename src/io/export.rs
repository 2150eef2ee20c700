use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::application::{ExpenseService, ExpenseSummary};
use crate::domain::{Balance, CategoryTotal, Expense, ExpenseFilter, PersonTotal};

/// Column headers of the tabular expense export, in order.
pub const EXPENSE_CSV_HEADERS: [&str; 7] = [
    "Description",
    "Amount",
    "Category",
    "Date",
    "Paid By",
    "Split Between",
    "Per Person Share",
];

/// Separator used to join participant names in a single CSV cell.
pub const SPLIT_SEPARATOR: &str = ", ";

/// Snapshot of one user's expenses for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub user_id: String,
    pub expenses: Vec<Expense>,
}

/// Exporter for converting expenses to CSV or JSON
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export the filtered expenses to CSV format
    pub async fn export_expenses_csv<W: Write>(
        &self,
        writer: W,
        filter: &ExpenseFilter,
    ) -> Result<usize> {
        let expenses = self.service.list_expenses(filter).await?;
        let count = write_expenses_csv(writer, &expenses)?;
        info!(count, "exported expenses to csv");
        Ok(count)
    }

    /// Export balances and totals for the filtered expenses as JSON
    pub async fn export_summary_json<W: Write>(
        &self,
        mut writer: W,
        filter: &ExpenseFilter,
    ) -> Result<ExpenseSummary> {
        let summary = self.service.summary(filter).await?;

        let json = serde_json::to_string_pretty(&summary)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(summary)
    }

    /// Export every expense of the current user as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<ExpenseSnapshot> {
        let expenses = self
            .service
            .list_expenses(&ExpenseFilter::default())
            .await?;

        let snapshot = ExpenseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            user_id: self.service.user_id().to_string(),
            expenses,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        info!(count = snapshot.expenses.len(), "exported full snapshot");
        Ok(snapshot)
    }
}

/// Write expenses using the tabular export layout. Returns the number of rows.
pub fn write_expenses_csv<W: Write>(writer: W, expenses: &[Expense]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPENSE_CSV_HEADERS)?;

    for expense in expenses {
        csv_writer.write_record(&[
            expense.description.clone(),
            expense.amount.to_string(),
            expense.category.as_str().to_string(),
            expense.date.clone(),
            expense.paid_by.clone(),
            expense.split_between.join(SPLIT_SEPARATOR),
            expense.per_person_share.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(expenses.len())
}

/// Write per-person balances as CSV. Returns the number of rows.
pub fn write_balances_csv<W: Write>(writer: W, balances: &[Balance]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["person", "total_paid", "total_owed", "net_balance"])?;

    for b in balances {
        csv_writer.write_record(&[
            b.person.clone(),
            b.total_paid.to_string(),
            b.total_owed.to_string(),
            b.net_balance.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(balances.len())
}

pub fn write_category_totals_csv<W: Write>(writer: W, totals: &[CategoryTotal]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["category", "total"])?;

    for t in totals {
        csv_writer.write_record([t.category.as_str(), t.total.to_string().as_str()])?;
    }

    csv_writer.flush()?;
    Ok(totals.len())
}

pub fn write_person_totals_csv<W: Write>(writer: W, totals: &[PersonTotal]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["person", "total"])?;

    for t in totals {
        csv_writer.write_record([t.person.as_str(), t.total.to_string().as_str()])?;
    }

    csv_writer.flush()?;
    Ok(totals.len())
}
