use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::prelude::*;
use crate::service::account::AccountError;
use crate::service::showcase::ShowcaseError;
use crate::service::tracker::TrackerError;

#[derive(Debug, Snafu, Serialize)]
#[snafu(visibility(pub(crate)))]
#[serde(tag = "error", content = "data")]
pub enum ApiError {
    #[snafu(display("request is not authenticated"))]
    Unauthenticated {
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("user `{user_id}` does not exist"))]
    UnknownUser {
        user_id: String,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("line `{line_id}` does not exist"))]
    LineNotFound {
        line_id: String,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Toggle {
        #[serde(skip)]
        source: TrackerError,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Showcase {
        #[serde(skip)]
        source: ShowcaseError,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Account {
        #[serde(skip)]
        source: AccountError,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to query the database"))]
    Database {
        #[serde(skip)]
        source: DatabaseQueryError,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated { .. } | ApiError::UnknownUser { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::LineNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Toggle { source, .. } => match source {
                TrackerError::StationNotFound { .. } => StatusCode::NOT_FOUND,
                TrackerError::StaleToggle { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Showcase { source, .. } => match source {
                ShowcaseError::BadgeNotFound { .. } => StatusCode::NOT_FOUND,
                ShowcaseError::NotEarned { .. } => StatusCode::FORBIDDEN,
                ShowcaseError::Full { .. } => StatusCode::BAD_REQUEST,
                ShowcaseError::UserGone { .. } => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Account { source, .. } => match source {
                AccountError::BlankUsername { .. } => StatusCode::BAD_REQUEST,
                AccountError::UsernameTaken { .. } => StatusCode::CONFLICT,
                AccountError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Where the underlying problem was raised.
    fn origin(&self) -> Location {
        match self {
            ApiError::Toggle { source, .. } => source.location(),
            ApiError::Showcase { source, .. } => source.location(),
            ApiError::Account { source, .. } => source.location(),
            ApiError::Database { source, .. } => source.location(),
            _ => self.location(),
        }
    }
}

impl Located for ApiError {
    fn location(&self) -> Location {
        match self {
            ApiError::Unauthenticated { location }
            | ApiError::UnknownUser { location, .. }
            | ApiError::LineNotFound { location, .. }
            | ApiError::Toggle { location, .. }
            | ApiError::Showcase { location, .. }
            | ApiError::Account { location, .. }
            | ApiError::Database { location, .. } => *location,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(flatten)]
    data: ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, location = %self.origin(), "{self}");
        } else {
            tracing::debug!(%status, location = %self.origin(), "{self}");
        }

        let content = ErrorResponse {
            message: self.to_string(),
            data: self,
        };

        (status, Json(content)).into_response()
    }
}
