use axum::extract::{Path, State};
use axum::Json;
use tracing::instrument;

use super::error::{DatabaseSnafu, ShowcaseSnafu};
use super::extract::CurrentUser;
use super::state::App;
use super::views::BadgeStatusView;
use super::Result;
use crate::prelude::*;
use crate::service::profile::badge_statuses;
use crate::service::showcase;
use crate::service::snapshot::Snapshot;

#[instrument(skip(app, user), fields(user = %user.id))]
pub async fn list(
    State(app): State<App>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<BadgeStatusView>>> {
    let snapshot = Snapshot::load(&user.id, &app.database)
        .await
        .context(DatabaseSnafu)?;

    let aggregates = snapshot.aggregates(app.clock);
    let statuses = badge_statuses(&snapshot.catalog, &snapshot.earned, &aggregates);

    Ok(Json(statuses.iter().map(BadgeStatusView::from).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResponse {
    pub success: bool,
    pub displayed: bool,
    pub displayed_badges: Vec<String>,
}

#[instrument(skip(app, user), fields(user = %user.id))]
pub async fn display(
    State(app): State<App>,
    CurrentUser(user): CurrentUser,
    Path(badge): Path<String>,
) -> Result<Json<DisplayResponse>> {
    let update = showcase::toggle_displayed(&user, &Record::new(badge), &app.database)
        .await
        .context(ShowcaseSnafu)?;

    Ok(Json(DisplayResponse {
        success: true,
        displayed: update.displayed,
        displayed_badges: update.badges.iter().map(Record::key).collect(),
    }))
}
