use std::collections::{HashMap, HashSet};

use tracing::instrument;

use super::network::Network;
use super::progress::{progress, COMPLETE};
use super::snapshot::{Aggregates, Snapshot};
use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeStatus {
    pub badge: Badge,
    pub unlocked: bool,
    /// 100 for unlocked badges.
    pub progress: u8,
}

/// Every badge of the catalog with the user's progress towards it, unlocked badges first, then the closest ones.
pub fn badge_statuses(
    catalog: &[Badge],
    earned: &HashSet<Record<Badge>>,
    aggregates: &Aggregates,
) -> Vec<BadgeStatus> {
    let mut statuses: Vec<BadgeStatus> = catalog
        .iter()
        .map(|badge| {
            let unlocked = earned.contains(&badge.id);
            BadgeStatus {
                badge: badge.clone(),
                unlocked,
                progress: if unlocked {
                    COMPLETE
                } else {
                    progress(&badge.criteria, aggregates)
                },
            }
        })
        .collect();

    statuses.sort_by(|a, b| {
        b.unlocked
            .cmp(&a.unlocked)
            .then_with(|| b.progress.cmp(&a.progress))
    });

    statuses
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStats {
    pub line: Line,
    pub total: u32,
    pub passed: u32,
    pub stopped: u32,
}

impl LineStats {
    pub fn passed_percentage(&self) -> f64 {
        percentage(self.passed, self.total)
    }

    pub fn stopped_percentage(&self) -> f64 {
        percentage(self.stopped, self.total)
    }

    pub fn is_active(&self) -> bool {
        self.passed > 0 || self.stopped > 0
    }
}

/// `part / total` in percent, rounded to one decimal.
pub fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }

    (f64::from(part) / f64::from(total) * 1000.0).round() / 10.0
}

/// Passed and stopped counts of every line, in network order.
pub fn line_stats(network: &Network, states: &[StationState]) -> Vec<LineStats> {
    let mut counts: HashMap<&Record<Line>, (u32, u32)> = HashMap::new();

    for state in states {
        if let Some(line) = network.line_of(&state.station) {
            let (passed, stopped) = counts.entry(line).or_default();
            *passed += u32::from(state.passed);
            *stopped += u32::from(state.stopped);
        }
    }

    network
        .lines()
        .iter()
        .map(|line| {
            let (passed, stopped) = counts.get(&line.id).copied().unwrap_or_default();
            LineStats {
                line: line.clone(),
                total: network.station_count(&line.id),
                passed,
                stopped,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: User,
    pub total_passed: u32,
    pub total_stopped: u32,
    /// Only lines the user has marked at least one station of.
    pub lines: Vec<LineStats>,
    pub badges: Vec<BadgeStatus>,
    /// The showcase, restricted to badges that are still in the catalog and earned.
    pub displayed: Vec<Badge>,
}

impl Profile {
    #[instrument(skip_all, fields(user = %user.id))]
    pub async fn load(user: User, clock: LocalTime, db: &Database) -> Result<Self, DatabaseQueryError> {
        let snapshot = Snapshot::load(&user.id, db).await?;
        Ok(Self::from_snapshot(user, &snapshot, clock))
    }

    pub fn from_snapshot(user: User, snapshot: &Snapshot, clock: LocalTime) -> Self {
        let aggregates = snapshot.aggregates(clock);

        let lines = line_stats(&snapshot.network, &snapshot.states)
            .into_iter()
            .filter(LineStats::is_active)
            .collect();

        let displayed = user
            .displayed_badges
            .iter()
            .filter(|id| snapshot.earned.contains(*id))
            .filter_map(|id| snapshot.catalog.iter().find(|badge| &badge.id == id))
            .cloned()
            .collect();

        Self {
            total_passed: aggregates.passed,
            total_stopped: aggregates.stopped,
            lines,
            badges: badge_statuses(&snapshot.catalog, &snapshot.earned, &aggregates),
            displayed,
            user,
        }
    }
}
