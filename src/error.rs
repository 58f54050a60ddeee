use std::net::SocketAddr;

use snafu::{Location, Snafu};

use crate::database::{DatabaseConnectionError, DatabaseQueryError};
use crate::service::catalog::CatalogError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// Could not read the configuration from the environment
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("UTC_OFFSET_MINUTES must be less than a day away from UTC, got {minutes}"))]
    UtcOffset {
        minutes: i32,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not connect to the database
    #[snafu(context(false))]
    ConnectDatabase {
        source: DatabaseConnectionError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not seed the badge catalog or the network
    Seed {
        source: CatalogError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not backfill first visit dates
    Backfill {
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not serve the application
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not bind to {address}, check if it's already in use"))]
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },
}
