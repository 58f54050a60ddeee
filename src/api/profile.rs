use axum::extract::State;
use axum::Json;
use tracing::instrument;

use super::error::DatabaseSnafu;
use super::extract::CurrentUser;
use super::state::App;
use super::views::{BadgeStatusView, BadgeSummary, LineStatsView, UserView};
use super::Result;
use crate::prelude::*;
use crate::service::profile::Profile;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: UserView,
    pub total_passed: u32,
    pub total_stopped: u32,
    pub line_stats: Vec<LineStatsView>,
    pub badges: Vec<BadgeStatusView>,
    pub displayed_badges: Vec<BadgeSummary>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user: UserView::from(&profile.user),
            total_passed: profile.total_passed,
            total_stopped: profile.total_stopped,
            line_stats: profile.lines.iter().map(LineStatsView::from).collect(),
            badges: profile.badges.iter().map(BadgeStatusView::from).collect(),
            displayed_badges: profile.displayed.iter().map(BadgeSummary::from).collect(),
        }
    }
}

#[instrument(skip(app, user), fields(user = %user.id))]
pub async fn show(
    State(app): State<App>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>> {
    let profile = Profile::load(user, app.clock, &app.database)
        .await
        .context(DatabaseSnafu)?;

    Ok(Json(ProfileResponse::from(&profile)))
}
