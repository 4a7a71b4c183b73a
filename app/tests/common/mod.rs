//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for the dashboard host integration tests.

#![allow(dead_code)]

use app_lib::{create_app_state, open_session, AppState, SessionId, SessionOpened};
use crossfilter::DashboardDefinition;
use dataset::{Dataset, Schema};

/// (DefectType, FeatureType, TestType, ModifiedSummary, Label, Creator)
pub const ISSUES: &[[&str; 6]] = &[
    ["UI", "Login", "Smoke", "Q101", "frontend", "ana"],
    ["UI", "Search", "Regression", "Q102", "frontend", "ben"],
    ["Crash", "Login", "Smoke", "Q101", "backend", "ana"],
    ["Crash", "Export", "Regression", "Q103", "backend", "cy"],
    ["Perf", "Search", "Smoke", "Q102", "TBD", "ben"],
    ["UI", "Login", "Smoke", "Q101", "frontend", "cy"],
    ["Crash", "Login", "Exploratory", "TBD", "backend", "ana"],
    ["Perf", "Export", "Regression", "Q103", "perf", "ben"],
];

pub fn issue_dataset() -> Dataset {
    let schema = Schema::new(dataset::issue_tracker_fields()).unwrap();
    Dataset::from_rows(schema, ISSUES.iter()).unwrap()
}

/// Test harness for creating and managing test state.
pub struct TestHarness {
    pub state: AppState,
}

impl TestHarness {
    /// Harness over the issue fixture and the built-in dashboard.
    pub fn new() -> Self {
        TestHarness {
            state: create_app_state(issue_dataset(), &DashboardDefinition::issue_tracker()).unwrap(),
        }
    }

    pub fn open(&self) -> SessionOpened {
        open_session(&self.state).unwrap()
    }

    pub fn open_id(&self) -> SessionId {
        self.open().session_id
    }
}
