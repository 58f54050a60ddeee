use derive_new::new;

use crate::database::Database;
use crate::service::{BadgeEvaluator, StationTracker};
use crate::time::LocalTime;

#[derive(Debug, Clone, new)]
pub struct App {
    pub database: Database,
    pub tracker: StationTracker,
    pub evaluator: BadgeEvaluator,
    pub clock: LocalTime,
}

pub fn create_app(database: Database, clock: LocalTime) -> App {
    let evaluator = BadgeEvaluator::new(database.clone(), clock);
    let tracker = StationTracker::new(database.clone(), evaluator.clone());

    App {
        database,
        tracker,
        evaluator,
        clock,
    }
}
