use std::collections::HashSet;

use tracing::instrument;

use super::snapshot::{Aggregates, Snapshot};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum EvaluationError {
    #[snafu(display("failed to load the station snapshot of `{user}`"))]
    LoadSnapshot {
        user: Record<User>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to record {count} new badge(s) for `{user}`"))]
    Award {
        user: Record<User>,
        count: usize,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for EvaluationError {
    fn location(&self) -> Location {
        match self {
            EvaluationError::LoadSnapshot { location, .. }
            | EvaluationError::Award { location, .. } => *location,
        }
    }
}

pub fn satisfies(criterion: &Criterion, aggregates: &Aggregates) -> bool {
    match criterion {
        Criterion::Stopped(n) => aggregates.stopped >= n.get(),
        Criterion::Passed(n) => aggregates.passed >= n.get(),
        Criterion::LineComplete(n) => aggregates.completed_lines >= n.get(),
        Criterion::AllStations => aggregates.stopped >= aggregates.total_stations,
        Criterion::NightVisit => aggregates.night_visit,
        Criterion::EarlyVisit => aggregates.early_visit,
        Criterion::DailyMarathon(n) => aggregates.max_stopped_in_a_day >= n.get(),
        Criterion::LinePassedSame(n) => aggregates.max_passed_on_a_line >= n.get(),
        Criterion::AccountCreated => true,
    }
}

/// The badges of `catalog`, in catalog order, that are satisfied but not yet earned.
pub fn newly_earned<'a>(
    catalog: &'a [Badge],
    earned: &HashSet<Record<Badge>>,
    aggregates: &Aggregates,
) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| !earned.contains(&badge.id))
        .filter(|badge| satisfies(&badge.criteria, aggregates))
        .collect()
}

/// Awards every badge a user has become eligible for.
///
/// Reads a fresh snapshot on each call and never touches station states, so calling it twice in a row awards nothing the second time.
#[derive(Debug, Clone, new)]
pub struct BadgeEvaluator {
    database: Database,
    clock: LocalTime,
}

impl BadgeEvaluator {
    #[instrument(skip(self), fields(%user))]
    pub async fn evaluate(&self, user: &Record<User>) -> Result<Vec<Badge>, EvaluationError> {
        let snapshot = Snapshot::load(user, &self.database)
            .await
            .context(LoadSnapshotSnafu { user: user.clone() })?;

        let aggregates = snapshot.aggregates(self.clock);
        let earned: Vec<Badge> = newly_earned(&snapshot.catalog, &snapshot.earned, &aggregates)
            .into_iter()
            .cloned()
            .collect();

        if earned.is_empty() {
            tracing::debug!(?aggregates, "no new badge");
            return Ok(earned);
        }

        let awarded_at = now();
        let awards: Vec<BadgeAward> = earned
            .iter()
            .map(|badge| BadgeAward::new(user.clone(), badge.id.clone(), awarded_at))
            .collect();

        BadgeAward::create_all(&awards, &self.database)
            .await
            .context(AwardSnafu {
                user: user.clone(),
                count: awards.len(),
            })?;

        for badge in &earned {
            tracing::info!(badge = %badge.name, criteria = %badge.criteria, "badge awarded");
        }

        Ok(earned)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::num::NonZeroU32;

    use super::*;

    pub fn badge(key: &str, position: u32, criteria: Criterion) -> Badge {
        Badge::new(
            Record::new(key.to_string()),
            position,
            key.replace('_', " "),
            format!("Unlocked by {criteria}"),
            "🏅".to_string(),
            "starter".to_string(),
            criteria,
        )
    }

    pub fn n(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }
}
