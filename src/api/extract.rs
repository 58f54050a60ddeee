use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::{ApiError, DatabaseSnafu, UnauthenticatedSnafu, UnknownUserSnafu};
use super::state::App;
use crate::prelude::*;

/// Set by the authenticating proxy in front of the service.
pub const USER_HEADER: &str = "x-user-id";

/// The user the request is made on behalf of.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<App> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .context(UnauthenticatedSnafu)?;

        let user = User::get(&Record::new(key.to_string()), &app.database)
            .await
            .context(DatabaseSnafu)?
            .context(UnknownUserSnafu { user_id: key })?;

        Ok(CurrentUser(user))
    }
}
