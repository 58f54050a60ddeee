//! Entities persisted in SurrealDB, one table each.

pub use award::*;
pub use badge::*;
pub use criterion::*;
pub use line::*;
pub use station::*;
pub use station_state::*;
pub use user::*;

mod award;
mod badge;
mod criterion;
mod line;
mod station;
mod station_state;
mod user;
