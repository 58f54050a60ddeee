//! Everything between the HTTP layer and the database.

pub mod account;
pub mod backfill;
pub mod catalog;
pub mod evaluator;
pub mod lines;
pub mod network;
pub mod profile;
pub mod progress;
pub mod showcase;
pub mod snapshot;
pub mod toggle;
pub mod tracker;

pub use evaluator::BadgeEvaluator;
pub use tracker::StationTracker;
