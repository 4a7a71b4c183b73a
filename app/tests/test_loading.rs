//! FILENAME: tests/test_loading.rs
//! Configuration-driven startup and export.

mod common;

use std::fs;

use app_lib::{
    create_app_state, export_session, handle_selection, open_session, AppConfig, AppError,
    SelectionRequest,
};
use common::TestHarness;
use tempfile::TempDir;

const RAW_EXPORT: &str = r#"[
    {"Defect Type": "UI", "Feature Type": "Login", "Test Type": "Smoke", "Summary": "Q7 login button misaligned", "Labels": "frontend", "Creator": "ana"},
    {"Defect Type": "Crash", "Feature Type": "Login", "Test Type": "Smoke", "Summary": "crash on Q7 submit", "Labels": null, "Creator": "ben"},
    {"Defect Type": "Crash", "Feature Type": "Export", "Test Type": "Regression", "Summary": "export hangs", "Labels": "backend", "Creator": "cy"}
]"#;

#[test]
fn test_config_driven_startup() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("issues.json");
    fs::write(&data, RAW_EXPORT).unwrap();

    let config_path = dir.path().join("drilldown.json");
    fs::write(
        &config_path,
        format!(r#"{{"data": {}}}"#, serde_json::to_string(&data).unwrap()),
    )
    .unwrap();

    let config = AppConfig::load(&config_path).unwrap();
    let dataset = config.load_dataset().unwrap();
    assert_eq!(dataset.len(), 3);

    let state = create_app_state(dataset, &config.load_dashboard().unwrap()).unwrap();
    let opened = open_session(&state).unwrap();

    let response = handle_selection(
        &state,
        &SelectionRequest {
            session_id: opened.session_id,
            source_node_id: "test-type".to_string(),
            selected_value: Some("Smoke".to_string()),
        },
    )
    .unwrap();

    let quest = response
        .updated
        .iter()
        .find(|c| c.node_id == "modified-summary")
        .unwrap();
    assert_eq!(quest.categories, vec!["Q7"]);
    assert_eq!(quest.counts, vec![2]);
}

#[test]
fn test_custom_dashboard_file() {
    let dir = TempDir::new().unwrap();
    let dashboard = dir.path().join("dashboard.json");
    fs::write(
        &dashboard,
        r#"{"charts": [
            {"id": "creators", "field": "Creator"},
            {"id": "tests", "field": "TestType", "upstream_fields": ["Creator"]}
        ]}"#,
    )
    .unwrap();

    let config = AppConfig {
        dashboard: Some(dashboard),
        ..AppConfig::default()
    };
    let definition = config.load_dashboard().unwrap();
    let state = create_app_state(common::issue_dataset(), &definition).unwrap();
    let opened = open_session(&state).unwrap();
    assert_eq!(opened.charts.len(), 2);
    assert_eq!(opened.charts[0].caption, "Creator Distribution");
}

#[test]
fn test_dashboard_referencing_unknown_field() {
    let dir = TempDir::new().unwrap();
    let dashboard = dir.path().join("dashboard.json");
    fs::write(&dashboard, r#"{"charts": [{"id": "x", "field": "Priority"}]}"#).unwrap();

    let config = AppConfig {
        dashboard: Some(dashboard),
        ..AppConfig::default()
    };
    let definition = config.load_dashboard().unwrap();
    let result = create_app_state(common::issue_dataset(), &definition);
    assert!(matches!(result, Err(AppError::Graph(_))));
}

#[test]
fn test_export_session_workbook() {
    let h = TestHarness::new();
    let id = h.open_id();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("charts.xlsx");

    let written = export_session(&h.state, id, &path).unwrap();
    assert_eq!(written, 5);
    assert!(path.exists());
}
