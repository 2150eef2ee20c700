use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::application::{DEFAULT_USER, ExpenseService, NewExpense};
use crate::domain::{
    Balance, Category, CategoryFilter, DateRange, Expense, ExpenseFilter, format_amount,
    parse_amount,
};
use crate::io::{write_balances_csv, write_category_totals_csv, write_person_totals_csv};

/// Splitledger - Shared Expense Tracker
#[derive(Parser)]
#[command(name = "splitledger")]
#[command(about = "Track shared expenses and see who owes whom")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPLITLEDGER_DB", default_value = "splitledger.db")]
    pub database: String,

    /// Whose expense collection to work on
    #[arg(short, long, env = "SPLITLEDGER_USER", default_value = DEFAULT_USER, global = true)]
    pub user: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a shared expense
    Add {
        /// What the money was spent on
        description: String,

        /// Total amount (e.g., "300" or "45.50")
        amount: String,

        /// Who paid
        #[arg(short, long)]
        paid_by: String,

        /// People sharing the cost, comma separated (e.g., "Alice,Bob,Carol")
        #[arg(short, long, value_delimiter = ',', required = true)]
        split: Vec<String>,

        /// Category: food, travel, shopping, utilities, other
        #[arg(short, long, default_value = "food")]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Custom expense id (generated if omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// List recorded expenses
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of expenses to show (most recent)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a single expense
    Show {
        /// Expense ID
        id: String,
    },

    /// Show how much each person paid, owes, and their net balance
    Balances {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending totals
    #[command(subcommand)]
    Report(ReportCommands),

    /// Overview of balances and totals
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List everyone who appears in any expense
    People,

    /// Export expenses to CSV or JSON
    Export {
        /// What to export: expenses, summary, full
        #[arg(default_value = "expenses")]
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Import expenses from CSV or JSON
    Import {
        /// What to import: expenses, full
        #[arg(default_value = "expenses")]
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete all expenses of the current user
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Total spent per category
    Categories {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Total paid per person
    People {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

/// Filters shared by every command that reads expenses.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only expenses on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only expenses on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Only this category, or "all"
    #[arg(long)]
    pub category: Option<String>,

    /// Only expenses this person paid for or shares
    #[arg(long)]
    pub person: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<ExpenseFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(c) if c.eq_ignore_ascii_case("all") => CategoryFilter::All,
            Some(c) => CategoryFilter::Only(c.parse::<Category>().map_err(anyhow::Error::msg)?),
        };

        Ok(ExpenseFilter {
            date_range: DateRange::new(
                self.from.clone().unwrap_or_default(),
                self.to.clone().unwrap_or_default(),
            ),
            category,
            person: self.person.clone().filter(|p| !p.trim().is_empty()),
        })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let user = self.user.as_str();

        match self.command {
            Commands::Init => {
                ExpenseService::init(&self.database, user).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                description,
                amount,
                paid_by,
                split,
                category,
                date,
                id,
            } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                let amount =
                    parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let category = category.parse::<Category>().map_err(anyhow::Error::msg)?;
                let date = date.unwrap_or_else(|| Utc::now().date_naive().to_string());

                let expense = service
                    .add_expense(NewExpense {
                        id,
                        description,
                        amount,
                        category,
                        date,
                        paid_by,
                        split_between: split,
                    })
                    .await?;

                println!(
                    "Recorded expense: {} paid {} for {} ({} each, {})",
                    expense.paid_by,
                    format_amount(expense.amount),
                    expense.description,
                    format_amount(expense.per_person_share),
                    expense.id
                );
            }

            Commands::List { filter, limit } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_list_command(&service, &filter.to_filter()?, limit).await?;
            }

            Commands::Show { id } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                let expense = service.get_expense(&id).await?;
                print_expense(&expense);
            }

            Commands::Balances { filter, format } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_balances_command(&service, &filter.to_filter()?, &format).await?;
            }

            Commands::Report(report_cmd) => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_report_command(&service, report_cmd).await?;
            }

            Commands::Summary { filter, format } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_summary_command(&service, &filter.to_filter()?, &format).await?;
            }

            Commands::People => {
                let service = ExpenseService::connect(&self.database, user).await?;
                let people = service.people().await?;
                if people.is_empty() {
                    println!("No people found.");
                }
                for person in people {
                    println!("{}", person);
                }
            }

            Commands::Export {
                export_type,
                output,
                filter,
            } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_export_command(
                    &service,
                    &export_type,
                    output.as_deref(),
                    &filter.to_filter()?,
                )
                .await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
            } => {
                let service = ExpenseService::connect(&self.database, user).await?;
                run_import_command(&service, &import_type, input.as_deref(), dry_run).await?;
            }

            Commands::Clear { yes } => {
                if !yes {
                    anyhow::bail!("Refusing to delete all expenses without --yes");
                }
                let service = ExpenseService::connect(&self.database, user).await?;
                let removed = service.clear_all().await?;
                println!("Cleared {} expense(s) for {}", removed, user);
            }
        }

        Ok(())
    }
}

async fn run_list_command(
    service: &ExpenseService,
    filter: &ExpenseFilter,
    limit: Option<usize>,
) -> Result<()> {
    let expenses = service.list_expenses(filter).await?;

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    let skip = limit.map_or(0, |lim| expenses.len().saturating_sub(lim));

    println!(
        "{:<12} {:>10} {:<10} {:<12} {:<25} DESCRIPTION",
        "DATE", "AMOUNT", "CATEGORY", "PAID BY", "SPLIT"
    );
    println!("{}", "-".repeat(90));

    for expense in expenses.iter().skip(skip) {
        println!(
            "{:<12} {:>10} {:<10} {:<12} {:<25} {}",
            expense.date,
            format_amount(expense.amount),
            expense.category,
            truncate(&expense.paid_by, 12),
            truncate(&expense.split_between.join(", "), 25),
            truncate(&expense.description, 30)
        );
    }
    Ok(())
}

fn print_expense(expense: &Expense) {
    println!("Expense: {}", expense.description);
    println!("  ID:          {}", expense.id);
    println!("  Amount:      {}", format_amount(expense.amount));
    println!("  Category:    {}", expense.category);
    println!("  Date:        {}", expense.date);
    println!("  Paid by:     {}", expense.paid_by);
    println!("  Split:       {}", expense.split_between.join(", "));
    println!("  Per person:  {}", format_amount(expense.per_person_share));
    println!(
        "  Recorded:    {}",
        expense.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

async fn run_balances_command(
    service: &ExpenseService,
    filter: &ExpenseFilter,
    format: &str,
) -> Result<()> {
    let balances = service.balances(filter).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        "csv" => {
            write_balances_csv(std::io::stdout().lock(), &balances)?;
        }
        _ => print_balances_table(&balances),
    }
    Ok(())
}

fn print_balances_table(balances: &[Balance]) {
    if balances.is_empty() {
        println!("No balances to show.");
        return;
    }

    println!(
        "{:<20} {:>12} {:>12} {:>12}  STATUS",
        "PERSON", "PAID", "OWED", "NET"
    );
    println!("{}", "-".repeat(70));
    for b in balances {
        println!(
            "{:<20} {:>12} {:>12} {:>12}  {}",
            truncate(&b.person, 20),
            format_amount(b.total_paid),
            format_amount(b.total_owed),
            format_amount(b.net_balance),
            b.status().as_str()
        );
    }
}

async fn run_report_command(service: &ExpenseService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Categories { filter, format } => {
            let totals = service.category_totals(&filter.to_filter()?).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&totals)?),
                "csv" => {
                    write_category_totals_csv(std::io::stdout().lock(), &totals)?;
                }
                _ => {
                    if totals.is_empty() {
                        println!("No expenses found.");
                        return Ok(());
                    }
                    println!("{:<20} {:>12}", "CATEGORY", "TOTAL");
                    println!("{}", "-".repeat(33));
                    for t in &totals {
                        println!("{:<20} {:>12}", t.category, format_amount(t.total));
                    }
                }
            }
        }

        ReportCommands::People { filter, format } => {
            let totals = service.person_totals(&filter.to_filter()?).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&totals)?),
                "csv" => {
                    write_person_totals_csv(std::io::stdout().lock(), &totals)?;
                }
                _ => {
                    if totals.is_empty() {
                        println!("No expenses found.");
                        return Ok(());
                    }
                    println!("{:<20} {:>12}", "PAID BY", "TOTAL");
                    println!("{}", "-".repeat(33));
                    for t in &totals {
                        println!("{:<20} {:>12}", truncate(&t.person, 20), format_amount(t.total));
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_summary_command(
    service: &ExpenseService,
    filter: &ExpenseFilter,
    format: &str,
) -> Result<()> {
    let summary = service.summary(filter).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Expenses:    {}", summary.expense_count);
    println!("Total spent: {}", format_amount(summary.total_spent));
    println!();

    print_balances_table(&summary.balances);

    if !summary.by_category.is_empty() {
        println!();
        println!("{:<20} {:>12} {:>8}", "CATEGORY", "TOTAL", "PERCENT");
        println!("{}", "-".repeat(42));
        for (entry, percentage) in summary.category_percentages() {
            println!(
                "{:<20} {:>12} {:>7.1}%",
                entry.category,
                format_amount(entry.total),
                percentage
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &ExpenseService,
    export_type: &str,
    output: Option<&str>,
    filter: &ExpenseFilter,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(writer, filter).await?;
            if output.is_some() {
                eprintln!("Exported {} expense(s)", count);
            }
        }
        "summary" => {
            exporter.export_summary_json(writer, filter).await?;
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} expense(s)", snapshot.expenses.len());
            }
        }
        other => anyhow::bail!(
            "Unknown export type '{}'. Valid types: expenses, summary, full",
            other
        ),
    }
    Ok(())
}

async fn run_import_command(
    service: &ExpenseService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);
    let options = ImportOptions { dry_run };

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = match import_type {
        "expenses" => importer.import_expenses_csv(reader, options).await?,
        "full" => importer.import_full_json(reader, options).await?,
        other => anyhow::bail!("Unknown import type '{}'. Valid types: expenses, full", other),
    };

    let verb = if dry_run { "Validated" } else { "Imported" };
    println!(
        "{} {} expense(s), skipped {}",
        verb, result.imported, result.skipped
    );

    if !result.errors.is_empty() {
        println!("{} error(s):", result.errors.len());
        for err in &result.errors {
            match &err.field {
                Some(field) => println!("  line {} [{}]: {}", err.line, field, err.error),
                None => println!("  line {}: {}", err.line, err.error),
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
