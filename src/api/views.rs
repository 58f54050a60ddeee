//! JSON shapes shared by several endpoints. Records are exposed by their key only.

use crate::prelude::*;
use crate::service::profile::{BadgeStatus, LineStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeSummary {
    pub id: String,
    pub name: String,
    pub icon: String,
}

impl From<&Badge> for BadgeSummary {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id.key(),
            name: badge.name.clone(),
            icon: badge.icon.clone(),
        }
    }
}

pub fn summaries(badges: &[Badge]) -> Vec<BadgeSummary> {
    badges.iter().map(BadgeSummary::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub criteria: Criterion,
}

impl From<&Badge> for BadgeView {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id.key(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
            kind: badge.kind.clone(),
            criteria: badge.criteria,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeStatusView {
    pub badge: BadgeView,
    pub unlocked: bool,
    pub progress: u8,
}

impl From<&BadgeStatus> for BadgeStatusView {
    fn from(status: &BadgeStatus) -> Self {
        Self {
            badge: BadgeView::from(&status.badge),
            unlocked: status.unlocked,
            progress: status.progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    pub id: String,
    pub number: String,
    pub name: String,
    pub color: String,
    pub text_color: Option<String>,
}

impl From<&Line> for LineSummary {
    fn from(line: &Line) -> Self {
        Self {
            id: line.id.key(),
            number: line.number.clone(),
            name: line.name.clone(),
            color: line.color.clone(),
            text_color: line.text_color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatsView {
    pub line: LineSummary,
    pub total: u32,
    pub passed: u32,
    pub stopped: u32,
    pub passed_percentage: f64,
    pub stopped_percentage: f64,
}

impl From<&LineStats> for LineStatsView {
    fn from(stats: &LineStats) -> Self {
        Self {
            line: LineSummary::from(&stats.line),
            total: stats.total,
            passed: stats.passed,
            stopped: stats.stopped,
            passed_percentage: stats.passed_percentage(),
            stopped_percentage: stats.stopped_percentage(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub created_at: Timestamp,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.key(),
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}
