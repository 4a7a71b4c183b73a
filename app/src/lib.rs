//! FILENAME: app/src/lib.rs
// PURPOSE: Main library entry point for the drill-down dashboard host.
// CONTEXT: Owns the shared dataset and chart graph, and one reactive
// evaluator per viewer session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crossfilter::{DashboardDefinition, DependencyGraph, ReactiveEvaluator};
use dataset::Dataset;

pub mod api_types;
pub mod config;
pub mod error;
pub mod logging;
pub mod sessions;

pub use api_types::{
    format_caption, ChartResponse, FilterEntry, SelectionRequest, SelectionResponse,
    SessionId, SessionOpened,
};
pub use config::AppConfig;
pub use error::AppError;
pub use sessions::{
    close_session, export_session, handle_selection, open_session, reset_session,
    session_charts, session_count, session_filters,
};


// ============================================================================
// APPLICATION STATE
// ============================================================================

/// One session's evaluator. Locked only while that session handles a request.
pub type SessionHandle = Arc<Mutex<ReactiveEvaluator>>;

/// Shared, read-only inputs plus per-session evaluators.
/// The map lock is held only to look sessions up, insert or remove them;
/// evaluation runs under the session's own lock, so sessions never wait on
/// each other and each session handles its events one at a time.
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub graph: Arc<DependencyGraph>,
    pub sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl AppState {
    pub(crate) fn lock_sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<SessionId, SessionHandle>>, AppError> {
        self.sessions.lock().map_err(|_| AppError::LockPoisoned)
    }

    /// Looks a session up. The map lock is released before this returns.
    pub fn session_handle(&self, session_id: SessionId) -> Result<SessionHandle, AppError> {
        self.lock_sessions()?
            .get(&session_id)
            .cloned()
            .ok_or(AppError::UnknownSession(session_id))
    }
}

/// Validates the dashboard against the dataset and builds the shared state.
pub fn create_app_state(
    dataset: Dataset,
    definition: &DashboardDefinition,
) -> Result<AppState, AppError> {
    log_info!(
        "SYS",
        "Creating AppState: {} records, {} charts",
        dataset.len(),
        definition.charts.len()
    );
    let graph = DependencyGraph::build(definition, dataset.schema())?;

    Ok(AppState {
        dataset: Arc::new(dataset),
        graph: Arc::new(graph),
        sessions: Mutex::new(HashMap::new()),
    })
}
