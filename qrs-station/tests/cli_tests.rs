//! Command handler tests against a temporary data root

use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use qrs_common::config::{load_toml_config, TomlConfig};
use qrs_common::storage::{JsonFileStore, ScanRepository};
use qrs_common::time::FixedClock;
use qrs_common::{ScanRecord, Snapshot};
use qrs_station::cli::{ProductsCommand, RulesCommand};
use qrs_station::{commands, Station};
use tempfile::TempDir;

const GOOD_A: &str = "1234567W0000000001";
const GOOD_B: &str = "1234567W0000000002";
const GOOD_C: &str = "1234567W0000000003";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
}

fn station(dir: &TempDir) -> (Station, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        Local.with_ymd_and_hms(2024, 3, 12, 9, 15, 0).single().unwrap(),
    ));
    let station = Station::with_clock(
        JsonFileStore::new(dir.path()),
        TomlConfig::default(),
        clock.clone(),
    );
    (station, clock)
}

async fn seeded(dir: &TempDir) -> (Station, Arc<FixedClock>) {
    let (station, clock) = station(dir);
    station.store.seed_defaults().await.unwrap();
    let mut out = Vec::new();
    commands::products(
        &station,
        ProductsCommand::Add {
            name: "Air Valve".to_string(),
            rule: None,
        },
        &mut out,
    )
    .await
    .unwrap();
    (station, clock)
}

async fn scan_lines(station: &Station, input: &str) -> (commands::ScanSummary, String) {
    let mut out = Vec::new();
    let summary = commands::scan(station, "air_valve", None, input.as_bytes(), &mut out)
        .await
        .unwrap();
    (summary, String::from_utf8(out).unwrap())
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_init_seeds_catalog_and_config() {
    let dir = TempDir::new().unwrap();
    let (station, _) = station(&dir);
    let config_path = dir.path().join("etc").join("config.toml");

    let mut out = Vec::new();
    commands::init(&station, Some(&config_path), &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(station.store.products_path().exists());
    assert!(station.store.rules_path().exists());
    assert!(config_path.exists());
    assert!(text.contains("Data root"));

    let config = load_toml_config(Some(&config_path)).unwrap();
    assert_eq!(config.root_folder.as_deref(), Some(dir.path()));

    let mut again = Vec::new();
    commands::init(&station, Some(&config_path), &mut again).await.unwrap();
    assert!(String::from_utf8(again).unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_added_product_takes_default_rule() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;

    let products = station.store.read_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_value, "air_valve");
    assert_eq!(products[0].scan_rule.as_deref(), Some(r"^\d{7}W\d{10}$"));
}

#[tokio::test]
async fn test_add_product_twice_fails() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let result = commands::products(
        &station,
        ProductsCommand::Add {
            name: "Air Valve".to_string(),
            rule: None,
        },
        &mut Vec::new(),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(station.store.read_products().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_product_with_unknown_rule_fails() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let result = commands::products(
        &station,
        ProductsCommand::Add {
            name: "Pump".to_string(),
            rule: Some("no such rule".to_string()),
        },
        &mut Vec::new(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_rename_product_moves_recorded_data() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    scan_lines(&station, GOOD_A).await;

    commands::products(
        &station,
        ProductsCommand::Rename {
            id: "air_valve".to_string(),
            new_name: "Pressure Valve".to_string(),
        },
        &mut Vec::new(),
    )
    .await
    .unwrap();

    let products = station.store.read_products().await.unwrap();
    assert_eq!(products[0].product_value, "pressure_valve");
    assert_eq!(
        station
            .store
            .read_records("pressure_valve", today())
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(!station.store.target_dir("air_valve").exists());
}

#[tokio::test]
async fn test_remove_product_keeps_data() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    scan_lines(&station, GOOD_A).await;

    commands::products(
        &station,
        ProductsCommand::Remove {
            id: "air_valve".to_string(),
        },
        &mut Vec::new(),
    )
    .await
    .unwrap();

    assert!(station.store.read_products().await.unwrap().is_empty());
    assert!(station.store.data_path("air_valve", today()).exists());
}

#[tokio::test]
async fn test_rules_add_validates_pattern_and_default() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;

    let bad = commands::rules(
        &station,
        RulesCommand::Add {
            name: "broken".to_string(),
            pattern: "([".to_string(),
            default: false,
        },
        &mut Vec::new(),
    )
    .await;
    assert!(bad.is_err());

    commands::rules(
        &station,
        RulesCommand::Add {
            name: "short".to_string(),
            pattern: r"^\d{4}$".to_string(),
            default: true,
        },
        &mut Vec::new(),
    )
    .await
    .unwrap();

    let rules = station.store.read_rules().await.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.iter().filter(|r| r.is_default).count(), 1);
    assert!(rules.iter().any(|r| r.rule_name == "short" && r.is_default));

    let mut out = Vec::new();
    commands::rules(&station, RulesCommand::List, &mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("* short"));
}

// ============================================================================
// Scanning
// ============================================================================

#[tokio::test]
async fn test_scan_reports_accepted_and_rejected_codes() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;

    let input = format!("{}\n\n  {}  \nnot-a-code\n{}\n", GOOD_A, GOOD_B, GOOD_A);
    let (summary, text) = scan_lines(&station, &input).await;

    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 2);
    assert!(text.contains(&format!("OK  {}  total 1", GOOD_A)));
    assert!(text.contains(&format!("OK  {}  total 2", GOOD_B)));
    assert!(text.contains("ERR not-a-code"));
    assert!(text.contains("2 accepted, 2 rejected"));

    let stored = station.store.read_records("air_valve", today()).await.unwrap();
    let codes: Vec<&str> = stored.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec![GOOD_A, GOOD_B]);
}

#[tokio::test]
async fn test_scan_continues_existing_day() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    scan_lines(&station, GOOD_A).await;

    let (summary, text) = scan_lines(&station, &format!("{}\n{}\n", GOOD_A, GOOD_B)).await;
    assert!(text.starts_with("Scanning Air Valve for 2024-03-12 (1 recorded)"));
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 1);
}

#[tokio::test]
async fn test_scan_past_day_is_read_only() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let yesterday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

    let mut out = Vec::new();
    let summary = commands::scan(&station, "air_valve", Some(yesterday), GOOD_A.as_bytes(), &mut out)
        .await
        .unwrap();
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.rejected, 1);
    assert!(station.store.read_records("air_valve", yesterday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_target_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let result = commands::scan(&station, "nobody", None, GOOD_A.as_bytes(), &mut Vec::new()).await;
    assert!(result.is_err());
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_stats_json_matches_scans() {
    let dir = TempDir::new().unwrap();
    let (station, clock) = seeded(&dir).await;
    scan_lines(&station, &format!("{}\n{}\n", GOOD_A, GOOD_B)).await;
    clock.advance_ms(60 * 60 * 1000);
    scan_lines(&station, GOOD_C).await;

    let mut out = Vec::new();
    commands::stats(&station, "air_valve", None, true, &mut out).await.unwrap();
    let snapshot: Snapshot = serde_json::from_slice(&out).unwrap();

    assert_eq!(snapshot.total_capacity, 3);
    assert_eq!(snapshot.last_hour_capacity, 1);
    assert_eq!(snapshot.previous_hour_capacity, 2);
    assert!((snapshot.growth + 0.5).abs() < 1e-9);
    assert!((snapshot.speed - 1.5).abs() < 1e-9);
    assert_eq!(snapshot.chart_series.len(), 2);
    assert_eq!(snapshot.chart_series[0].label, "09:00");
}

#[tokio::test]
async fn test_stats_text_for_empty_day() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let mut out = Vec::new();
    commands::stats(&station, "air_valve", None, false, &mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("No scans recorded"));
}

#[tokio::test]
async fn test_records_pages_newest_first() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let records: Vec<ScanRecord> = (0..12)
        .map(|i| {
            let ts = Local
                .with_ymd_and_hms(2024, 3, 12, 8, i, 0)
                .single()
                .unwrap()
                .timestamp_millis();
            ScanRecord::new("Air Valve", "air_valve", format!("1234567W00000001{:02}", i), ts)
        })
        .collect();
    station
        .store
        .write_records("air_valve", today(), &records)
        .await
        .unwrap();

    let mut first = Vec::new();
    commands::records(&station, "air_valve", None, 1, None, &mut first).await.unwrap();
    let first = String::from_utf8(first).unwrap();
    assert!(first.lines().next().unwrap().ends_with("1234567W0000000111"));
    assert!(first.contains("Page 1 of 2 (12 records)"));

    let mut second = Vec::new();
    commands::records(&station, "air_valve", None, 2, None, &mut second).await.unwrap();
    let second = String::from_utf8(second).unwrap();
    assert_eq!(second.lines().count(), 3);
    assert!(second.lines().nth(1).unwrap().ends_with("1234567W0000000100"));

    let mut filtered = Vec::new();
    commands::records(&station, "air_valve", None, 1, Some("0105"), &mut filtered)
        .await
        .unwrap();
    assert!(String::from_utf8(filtered).unwrap().contains("Page 1 of 1 (1 records)"));
}

#[tokio::test]
async fn test_records_page_zero_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let result = commands::records(&station, "air_valve", None, 0, None, &mut Vec::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_persists_and_reports_missing() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    scan_lines(&station, &format!("{}\n{}\n", GOOD_A, GOOD_B)).await;

    assert!(commands::delete(&station, "air_valve", GOOD_A, None, &mut Vec::new())
        .await
        .unwrap());
    assert!(!commands::delete(&station, "air_valve", GOOD_A, None, &mut Vec::new())
        .await
        .unwrap());

    let stored = station.store.read_records("air_valve", today()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].code, GOOD_B);
}

#[tokio::test]
async fn test_history_lists_days_and_today() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let earlier = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    station
        .store
        .write_records(
            "air_valve",
            earlier,
            &[ScanRecord::new("Air Valve", "air_valve", GOOD_A, 0)],
        )
        .await
        .unwrap();

    let mut out = Vec::new();
    commands::history(&station, "air_valve", &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2024-03-10"));
    assert!(lines[1].starts_with("2024-03-12  (no records yet)"));
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_today_writes_workbook() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    scan_lines(&station, GOOD_A).await;

    let mut out = Vec::new();
    let outcomes = commands::export(&station, "air_valve", &[], false, &mut out)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].1.success);
    assert!(station.store.export_path("Air Valve", today()).exists());
}

#[tokio::test]
async fn test_export_all_and_empty_day() {
    let dir = TempDir::new().unwrap();
    let (station, _) = seeded(&dir).await;
    let earlier = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    station
        .store
        .write_records(
            "air_valve",
            earlier,
            &[ScanRecord::new("Air Valve", "air_valve", GOOD_A, 0)],
        )
        .await
        .unwrap();

    let outcomes = commands::export(&station, "air_valve", &[], true, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].0, earlier);
    assert!(outcomes[0].1.success);

    let mut out = Vec::new();
    let outcomes = commands::export(&station, "air_valve", &[today()], false, &mut out)
        .await
        .unwrap();
    assert!(!outcomes[0].1.success);
    assert!(String::from_utf8(out).unwrap().contains("failed"));
}
