use axum::extract::{Path, State};
use axum::Json;
use tracing::instrument;

use super::error::ToggleSnafu;
use super::extract::CurrentUser;
use super::state::App;
use super::views::{summaries, BadgeSummary};
use super::Result;
use crate::prelude::*;
use crate::service::toggle::ToggleRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub passed: bool,
    pub stopped: bool,
    pub first_passed_at: Option<Timestamp>,
    pub first_stopped_at: Option<Timestamp>,
    /// Send it back as `expectedUpdatedAt` to make sure the next toggle does not overwrite a concurrent one.
    pub updated_at: Timestamp,
    pub new_badges: Vec<BadgeSummary>,
}

#[instrument(skip(app, user), fields(user = %user.id))]
pub async fn toggle(
    State(app): State<App>,
    CurrentUser(user): CurrentUser,
    Path((line, station)): Path<(String, String)>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let outcome = app
        .tracker
        .toggle(&user.id, &Record::new(line), &Record::new(station), request)
        .await
        .context(ToggleSnafu)?;

    let state = outcome.state;
    Ok(Json(ToggleResponse {
        success: true,
        passed: state.passed,
        stopped: state.stopped,
        first_passed_at: state.first_passed_at,
        first_stopped_at: state.first_stopped_at,
        updated_at: state.updated_at,
        new_badges: summaries(&outcome.new_badges),
    }))
}
