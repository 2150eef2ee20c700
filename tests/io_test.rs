mod common;

use anyhow::Result;
use common::{TripExpenses, new_expense, test_service, test_service_for};
use chrono::{TimeZone, Utc};
use splitledger::application::{AppError, ExpenseService};
use splitledger::domain::{Category, ExpenseFilter};
use splitledger::io::{ExpenseSnapshot, Exporter, ImportOptions, Importer};

#[tokio::test]
async fn test_export_expenses_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    TripExpenses::record(&service).await?;

    let mut out = Vec::new();
    let count = Exporter::new(&service)
        .export_expenses_csv(&mut out, &ExpenseFilter::default())
        .await?;
    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(count, 3);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Description,Amount,Category,Date,Paid By,Split Between,Per Person Share"
    );
    assert_eq!(
        lines[1],
        "Dinner,300,Food,2024-03-01,Alice,\"Alice, Bob, Carol\",100"
    );

    Ok(())
}

#[tokio::test]
async fn test_export_respects_filter() -> Result<()> {
    let (service, _temp) = test_service().await?;
    TripExpenses::record(&service).await?;

    let mut out = Vec::new();
    let count = Exporter::new(&service)
        .export_expenses_csv(
            &mut out,
            &ExpenseFilter::default().with_category(Category::Travel),
        )
        .await?;

    assert_eq!(count, 1);
    assert!(String::from_utf8(out)?.contains("Train tickets"));

    Ok(())
}

#[tokio::test]
async fn test_csv_export_then_import_restores_balances() -> Result<()> {
    let (source, temp) = test_service_for("source").await?;
    TripExpenses::record(&source).await?;

    let mut out = Vec::new();
    Exporter::new(&source)
        .export_expenses_csv(&mut out, &ExpenseFilter::default())
        .await?;

    let db_path = temp.path().join("test.db");
    let target = ExpenseService::connect(db_path.to_str().unwrap(), "target").await?;
    let result = Importer::new(&target)
        .import_expenses_csv(out.as_slice(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 3);
    assert!(result.errors.is_empty());

    let filter = ExpenseFilter::default();
    assert_eq!(
        target.balances(&filter).await?,
        source.balances(&filter).await?
    );

    Ok(())
}

#[tokio::test]
async fn test_csv_import_collects_row_errors() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv = "\
Description,Amount,Category,Date,Paid By,Split Between,Per Person Share
Lunch,30,Food,2024-01-01,Alice,\"Alice, Bob\",15
Broken,abc,Food,2024-01-01,Alice,Alice,0
Rent,900,Housing,2024-01-01,Alice,Alice,900
Nobody,10,Other,2024-01-01,Alice,,0
";

    let result = Importer::new(&service)
        .import_expenses_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 3);
    assert_eq!(result.errors[0].line, 3);
    assert_eq!(result.errors[0].field.as_deref(), Some("Amount"));
    assert_eq!(result.errors[1].field.as_deref(), Some("Category"));
    assert_eq!(result.errors[2].line, 5);

    let expenses = service.list_expenses(&ExpenseFilter::default()).await?;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].split_between, vec!["Alice", "Bob"]);
    assert_eq!(expenses[0].per_person_share, 15.0);

    Ok(())
}

#[tokio::test]
async fn test_csv_dry_run_writes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv = "\
Description,Amount,Category,Date,Paid By,Split Between,Per Person Share
Lunch,30,Food,2024-01-01,Alice,\"Alice, Bob\",15
";

    let result = Importer::new(&service)
        .import_expenses_csv(csv.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 1);
    assert_eq!(service.count_expenses().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_full_json_snapshot_roundtrip_skips_existing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let recorded = TripExpenses::record(&service).await?;

    let mut out = Vec::new();
    let snapshot = Exporter::new(&service).export_full_json(&mut out).await?;
    assert_eq!(snapshot.expenses.len(), 3);
    assert_eq!(snapshot.user_id, "tester");

    // Importing into the same collection skips every id that already exists
    let again = Importer::new(&service)
        .import_full_json(out.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, 3);

    service.clear_all().await?;
    let restored = Importer::new(&service)
        .import_full_json(out.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(restored.imported, 3);

    let ids: Vec<String> = service
        .list_expenses(&ExpenseFilter::default())
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();
    let original_ids: Vec<String> = recorded.into_iter().map(|e| e.id).collect();
    assert_eq!(ids, original_ids);

    Ok(())
}

#[tokio::test]
async fn test_names_with_commas_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let as_payer = service
        .add_expense(new_expense(
            "Dinner",
            100.0,
            Category::Food,
            "2024-01-01",
            "Smith, J",
            &["Bob"],
        ))
        .await;
    assert!(matches!(as_payer, Err(AppError::InvalidExpense(_))));

    let as_participant = service
        .add_expense(new_expense(
            "Dinner",
            100.0,
            Category::Food,
            "2024-01-01",
            "Bob",
            &["Smith, J", "Bob"],
        ))
        .await;
    assert!(matches!(as_participant, Err(AppError::InvalidExpense(_))));

    assert_eq!(service.count_expenses().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_csv_row_with_comma_name_is_reported() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // A quoted payer cell survives CSV parsing but is still not a valid name
    let csv = "\
Description,Amount,Category,Date,Paid By,Split Between,Per Person Share
Dinner,100,Food,2024-01-01,\"Smith, J\",Bob,100
";

    let result = Importer::new(&service)
        .import_expenses_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 2);
    assert_eq!(service.count_expenses().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_snapshot_restore_keeps_stored_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;
    TripExpenses::record(&service).await?;

    let mut out = Vec::new();
    let mut snapshot = Exporter::new(&service).export_full_json(&mut out).await?;
    let created_at = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
    snapshot.expenses[0].created_at = created_at;
    let json = serde_json::to_vec(&snapshot)?;

    service.clear_all().await?;
    let result = Importer::new(&service)
        .import_full_json(json.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 3);

    let restored = service.list_expenses(&ExpenseFilter::default()).await?;
    assert_eq!(restored, snapshot.expenses);
    assert_eq!(restored[0].created_at, created_at);
    assert_eq!(restored[0].per_person_share, 100.0);

    Ok(())
}

#[tokio::test]
async fn test_snapshot_dry_run_matches_real_import() -> Result<()> {
    let (source, temp) = test_service_for("source").await?;
    TripExpenses::record(&source).await?;

    let mut out = Vec::new();
    let mut snapshot: ExpenseSnapshot = Exporter::new(&source).export_full_json(&mut out).await?;
    // The first expense appears twice in the file
    let repeated = snapshot.expenses[0].clone();
    snapshot.expenses.push(repeated);
    let json = serde_json::to_vec(&snapshot)?;

    let db_path = temp.path().join("test.db");
    let target = ExpenseService::connect(db_path.to_str().unwrap(), "target").await?;
    let importer = Importer::new(&target);

    let dry = importer
        .import_full_json(json.as_slice(), ImportOptions { dry_run: true })
        .await?;
    assert_eq!(target.count_expenses().await?, 0);

    let real = importer
        .import_full_json(json.as_slice(), ImportOptions::default())
        .await?;

    assert_eq!((dry.imported, dry.skipped), (3, 1));
    assert_eq!((real.imported, real.skipped), (dry.imported, dry.skipped));
    assert_eq!(target.count_expenses().await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_summary_json_export() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service
        .add_expense(new_expense(
            "Dinner",
            300.0,
            Category::Food,
            "2024-01-05",
            "Alice",
            &["Alice", "Bob", "Carol"],
        ))
        .await?;

    let mut out = Vec::new();
    let summary = Exporter::new(&service)
        .export_summary_json(&mut out, &ExpenseFilter::default())
        .await?;

    let json: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(json["expense_count"], 1);
    assert_eq!(json["balances"][0]["person"], "Alice");
    assert_eq!(json["balances"][0]["net_balance"], 200.0);
    assert_eq!(summary.balances.len(), 3);

    Ok(())
}
