use super::snapshot::Aggregates;
use crate::prelude::*;

pub const COMPLETE: u8 = 100;

/// How close the aggregates are to satisfying `criterion`, from 0 to 100.
///
/// Reads the same aggregates the evaluator does, so 100 is reported exactly when [satisfies](super::evaluator::satisfies) holds.
pub fn progress(criterion: &Criterion, aggregates: &Aggregates) -> u8 {
    match criterion {
        Criterion::Stopped(n) => percent(aggregates.stopped, n.get()),
        Criterion::Passed(n) => percent(aggregates.passed, n.get()),
        Criterion::LineComplete(n) => percent(aggregates.completed_lines, n.get()),
        Criterion::DailyMarathon(n) => percent(aggregates.max_stopped_in_a_day, n.get()),
        Criterion::LinePassedSame(n) => percent(aggregates.max_passed_on_a_line, n.get()),
        Criterion::AllStations => percent(aggregates.stopped, aggregates.total_stations),
        Criterion::NightVisit => flag(aggregates.night_visit),
        Criterion::EarlyVisit => flag(aggregates.early_visit),
        Criterion::AccountCreated => COMPLETE,
    }
}

/// `achieved / required` as a percentage rounded half up, kept below 100 until the requirement is met.
pub fn percent(achieved: u32, required: u32) -> u8 {
    if achieved >= required {
        return COMPLETE;
    }

    let (achieved, required) = (u64::from(achieved), u64::from(required));
    let rounded = (achieved * 200 + required) / (required * 2);

    rounded.min(u64::from(COMPLETE) - 1) as u8
}

fn flag(reached: bool) -> u8 {
    if reached {
        COMPLETE
    } else {
        0
    }
}
