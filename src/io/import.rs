use anyhow::Result;
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::application::{ExpenseService, NewExpense};
use crate::domain::{Category, parse_amount};
use crate::io::export::{EXPENSE_CSV_HEADERS, ExpenseSnapshot};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every row without writing anything
    pub dry_run: bool,
}

/// Importer for loading expenses into the current user's collection
pub struct Importer<'a> {
    service: &'a ExpenseService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Import expenses from the tabular CSV export layout.
    ///
    /// The "Per Person Share" column is informational only: shares are
    /// derived again from the amount and the split when a row is recorded.
    pub async fn import_expenses_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let amount = match parse_amount(field(1)) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some(EXPENSE_CSV_HEADERS[1].to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            let category = match field(2).parse::<Category>() {
                Ok(c) => c,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some(EXPENSE_CSV_HEADERS[2].to_string()),
                        error: e,
                    });
                    continue;
                }
            };

            let input = NewExpense {
                id: None,
                description: field(0).to_string(),
                amount,
                category,
                date: field(3).to_string(),
                paid_by: field(4).to_string(),
                split_between: parse_split(field(5)),
            };

            let outcome = if options.dry_run {
                self.service.prepare_expense(input).await.map(|_| ())
            } else {
                self.service.add_expense(input).await.map(|_| ())
            };

            match outcome {
                Ok(()) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        if !errors.is_empty() {
            warn!(rejected = errors.len(), "some rows were not imported");
        }
        info!(imported, dry_run = options.dry_run, "csv import finished");

        Ok(ImportResult {
            imported,
            skipped: 0,
            errors,
        })
    }

    /// Import a JSON snapshot. Each expense keeps its original id, creation
    /// time and per-person share. Expenses whose id already exists for the
    /// current user, or earlier in the same snapshot, are skipped.
    pub async fn import_full_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: ExpenseSnapshot = serde_json::from_reader(reader)?;
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (idx, expense) in snapshot.expenses.into_iter().enumerate() {
            let id = expense.id.trim().to_string();
            if seen.contains(&id) {
                debug!(%id, "skipping repeated expense in snapshot");
                skipped += 1;
                continue;
            }

            let outcome = if options.dry_run {
                self.service.prepare_restore(expense).await.map(|_| ())
            } else {
                self.service.restore_expense(expense).await.map(|_| ())
            };

            match outcome {
                Ok(()) => {
                    seen.insert(id);
                    imported += 1;
                }
                Err(crate::application::AppError::DuplicateExpense(id)) => {
                    debug!(%id, "skipping existing expense");
                    skipped += 1;
                }
                Err(e) => errors.push(ImportError {
                    line: idx + 1,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        info!(imported, skipped, dry_run = options.dry_run, "snapshot import finished");

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }
}

/// Split a comma-joined participant cell back into names.
fn parse_split(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
