//! The JSON surface of the tracker.

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod badges;
mod error;
mod extract;
mod lines;
mod profile;
mod state;
mod stations;
mod users;
mod views;


pub use error::ApiError;
pub use extract::{CurrentUser, USER_HEADER};
pub use state::{create_app, App};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/users", post(users::register))
        .route("/lines", get(lines::list))
        .route("/lines/:line", get(lines::show))
        .route("/lines/:line/stations/:station/toggle", post(stations::toggle))
        .route("/profile", get(profile::show))
        .route("/badges", get(badges::list))
        .route("/badges/:badge/display", post(badges::display))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}
