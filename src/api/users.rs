use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use super::error::AccountSnafu;
use super::state::App;
use super::views::{summaries, BadgeSummary, UserView};
use super::Result;
use crate::prelude::*;
use crate::service::account;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: UserView,
    pub new_badges: Vec<BadgeSummary>,
}

#[instrument(skip(app))]
pub async fn register(
    State(app): State<App>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let registration = account::register(&request.username, &app.evaluator, &app.database)
        .await
        .context(AccountSnafu)?;

    let response = RegisterResponse {
        user: UserView::from(&registration.user),
        new_badges: summaries(&registration.new_badges),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
