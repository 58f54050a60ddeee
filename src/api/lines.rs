use axum::extract::{Path, State};
use axum::Json;
use tracing::instrument;

use super::error::{DatabaseSnafu, LineNotFoundSnafu};
use super::extract::CurrentUser;
use super::state::App;
use super::views::{LineStatsView, LineSummary};
use super::Result;
use crate::prelude::*;
use crate::service::lines::LineView;

#[instrument(skip(app))]
pub async fn list(State(app): State<App>) -> Result<Json<Vec<LineSummary>>> {
    let lines = Line::all(&app.database).await.context(DatabaseSnafu)?;

    Ok(Json(lines.iter().map(LineSummary::from).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    pub id: String,
    pub name: String,
    pub position: u32,
    pub branch: Option<String>,
    pub passed: bool,
    pub stopped: bool,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct BranchView {
    pub name: String,
    pub stations: Vec<StationView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub line: LineSummary,
    pub main_stations: Vec<StationView>,
    pub branches: Vec<BranchView>,
    pub has_fork: bool,
    pub stats: LineStatsView,
}

impl From<LineView> for LineResponse {
    fn from(view: LineView) -> Self {
        let station = |station: Station| {
            let state = view.states.get(&station.id);
            StationView {
                id: station.id.key(),
                name: station.name,
                position: station.position,
                branch: station.branch,
                passed: state.is_some_and(|state| state.passed),
                stopped: state.is_some_and(|state| state.stopped),
                updated_at: state.map(|state| state.updated_at),
            }
        };

        let main_stations = view.trunk.iter().cloned().map(station).collect();
        let branches = view
            .branches
            .iter()
            .map(|(name, stations)| BranchView {
                name: name.clone(),
                stations: stations.iter().cloned().map(station).collect(),
            })
            .collect();

        Self {
            line: LineSummary::from(&view.line),
            main_stations,
            branches,
            has_fork: view.has_fork,
            stats: LineStatsView::from(&view.stats),
        }
    }
}

#[instrument(skip(app, user), fields(user = %user.id))]
pub async fn show(
    State(app): State<App>,
    CurrentUser(user): CurrentUser,
    Path(line): Path<String>,
) -> Result<Json<LineResponse>> {
    let view = LineView::load(&Record::new(line.clone()), &user.id, &app.database)
        .await
        .context(DatabaseSnafu)?
        .context(LineNotFoundSnafu { line_id: line })?;

    Ok(Json(view.into()))
}
