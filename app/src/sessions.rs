//! FILENAME: app/src/sessions.rs
// PURPOSE: Session lifecycle and selection handling.
// CONTEXT: Every session owns its own FilterState (inside its evaluator), so
// selections never leak between viewers.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crossfilter::{DistributionUpdate, FnSink, ReactiveEvaluator};
use uuid::Uuid;

use crate::api_types::{
    ChartResponse, FilterEntry, SelectionRequest, SelectionResponse, SessionId, SessionOpened,
};
use crate::logging::{log_debug, log_info, log_warn};
use crate::{AppError, AppState, SessionHandle};

fn lock_evaluator(handle: &SessionHandle) -> Result<MutexGuard<'_, ReactiveEvaluator>, AppError> {
    handle.lock().map_err(|_| AppError::LockPoisoned)
}

/// Starts a session with an empty filter and renders every chart once.
pub fn open_session(state: &AppState) -> Result<SessionOpened, AppError> {
    let mut evaluator = ReactiveEvaluator::new(state.dataset.clone(), state.graph.clone())?;
    let mut charts = Vec::new();
    evaluator.initial_render(&mut FnSink(|update: &DistributionUpdate| {
        charts.push(ChartResponse::from_update(update, &state.graph))
    }));

    let session_id = Uuid::new_v4();
    state
        .lock_sessions()?
        .insert(session_id, Arc::new(Mutex::new(evaluator)));
    log_info!("SESSION", "opened {} ({} charts)", session_id, charts.len());

    Ok(SessionOpened { session_id, charts })
}

/// Applies a selection. An unknown chart id leaves the session untouched and
/// comes back as a diagnostic rather than an error.
pub fn handle_selection(
    state: &AppState,
    request: &SelectionRequest,
) -> Result<SelectionResponse, AppError> {
    let handle = state.session_handle(request.session_id)?;
    let mut evaluator = lock_evaluator(&handle)?;

    let mut updated = Vec::new();
    let result = evaluator.try_on_selection(
        &request.to_event(),
        &mut FnSink(|update: &DistributionUpdate| {
            updated.push(ChartResponse::from_update(update, &state.graph))
        }),
    );
    let diagnostic = match result {
        Ok(ids) => {
            log_debug!(
                "SESSION",
                "{}: {} -> {:?} recomputed {:?}",
                request.session_id,
                request.source_node_id,
                request.selected_value,
                ids
            );
            None
        }
        Err(e) => {
            log_warn!("SESSION", "{}: ignoring selection: {}", request.session_id, e);
            Some(e.to_string())
        }
    };

    Ok(SelectionResponse {
        session_id: request.session_id,
        filter_version: evaluator.filter_snapshot().version(),
        updated,
        diagnostic,
    })
}

/// Clears every selection in the session and re-renders all charts.
pub fn reset_session(state: &AppState, session_id: SessionId) -> Result<Vec<ChartResponse>, AppError> {
    let handle = state.session_handle(session_id)?;
    let mut evaluator = lock_evaluator(&handle)?;

    let mut charts = Vec::new();
    evaluator.reset(&mut FnSink(|update: &DistributionUpdate| {
        charts.push(ChartResponse::from_update(update, &state.graph))
    }));
    log_info!("SESSION", "reset {}", session_id);
    Ok(charts)
}

/// Returns true when the session existed.
pub fn close_session(state: &AppState, session_id: SessionId) -> Result<bool, AppError> {
    let removed = state.lock_sessions()?.remove(&session_id).is_some();
    if removed {
        log_info!("SESSION", "closed {}", session_id);
    }
    Ok(removed)
}

pub fn session_count(state: &AppState) -> Result<usize, AppError> {
    Ok(state.lock_sessions()?.len())
}

/// Current selections, ordered by field name.
pub fn session_filters(state: &AppState, session_id: SessionId) -> Result<Vec<FilterEntry>, AppError> {
    let handle = state.session_handle(session_id)?;
    let evaluator = lock_evaluator(&handle)?;

    let filters = evaluator
        .filter_snapshot()
        .iter()
        .map(|(field, value)| FilterEntry {
            field: field.to_string(),
            value: value.to_string(),
        })
        .collect();
    Ok(filters)
}

/// The latest output of every chart, in evaluation order.
pub fn session_charts(state: &AppState, session_id: SessionId) -> Result<Vec<ChartResponse>, AppError> {
    let handle = state.session_handle(session_id)?;
    let evaluator = lock_evaluator(&handle)?;

    let charts = evaluator
        .outputs()
        .map(|update| ChartResponse::from_update(update, &state.graph))
        .collect();
    Ok(charts)
}

/// Writes the session's current charts to an xlsx workbook. Returns the
/// number of charts written.
pub fn export_session(state: &AppState, session_id: SessionId, path: &Path) -> Result<usize, AppError> {
    let handle = state.session_handle(session_id)?;
    let updates: Vec<DistributionUpdate> = lock_evaluator(&handle)?.outputs().cloned().collect();

    persistence::export_distributions_xlsx(path, &updates)?;
    log_info!("SESSION", "exported {} charts of {} to {}", updates.len(), session_id, path.display());
    Ok(updates.len())
}
