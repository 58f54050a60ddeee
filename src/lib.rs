pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod logger;
pub mod model;
pub mod service;
pub mod time;

pub mod prelude {
    pub use derive_new::new;
    pub use serde::{Deserialize, Serialize};
    pub use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};

    pub use crate::database::{Database, DatabaseQueryError, Record, Sql as _, Table, Thing};
    pub use crate::model::{Badge, BadgeAward, Criterion, Line, Station, StationState, User};
    pub use crate::time::{now, LocalTime, Timestamp};
    pub use crate::Located;
}

/// Errors that remember where in the crate they were raised.
pub trait Located {
    fn location(&self) -> snafu::Location;
}
