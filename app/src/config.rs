//! FILENAME: app/src/config.rs
// PURPOSE: Application configuration loaded from a JSON file.
// CONTEXT: Every field is optional in the file; command-line flags override
// whatever the file provides.

use std::path::{Path, PathBuf};

use crossfilter::DashboardDefinition;
use dataset::Dataset;
use log::LevelFilter;
use persistence::CleaningRules;
use serde::{Deserialize, Serialize};

use crate::logging::parse_level;
use crate::AppError;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Issue export to load (`.xlsx`, `.xlsm` or `.json`).
    #[serde(default)]
    pub data: Option<PathBuf>,
    /// Worksheet to read; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Dashboard definition JSON; the built-in issue-tracker dashboard when absent.
    #[serde(default)]
    pub dashboard: Option<PathBuf>,
    #[serde(default = "CleaningRules::issue_tracker")]
    pub cleaning: CleaningRules,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data: None,
            sheet: None,
            dashboard: None,
            cleaning: CleaningRules::issue_tracker(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, AppError> {
        parse_level(&self.log_level)
    }

    pub fn load_dashboard(&self) -> Result<DashboardDefinition, AppError> {
        match &self.dashboard {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Ok(DashboardDefinition::from_json(&text)?)
            }
            None => Ok(DashboardDefinition::issue_tracker()),
        }
    }

    pub fn load_dataset(&self) -> Result<Dataset, AppError> {
        let path = self
            .data
            .as_deref()
            .ok_or_else(|| AppError::Config("no data file configured".to_string()))?;
        Ok(persistence::load_dataset(path, self.sheet.as_deref(), &self.cleaning)?)
    }
}
