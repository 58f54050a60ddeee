use snafu::ensure;
use tracing::instrument;

use crate::prelude::*;

/// How many badges a profile can show off at once.
pub const MAX_DISPLAYED: usize = 3;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ShowcaseError {
    #[snafu(display("failed to load badge `{badge}`"))]
    LoadBadge {
        badge: Record<Badge>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to load the badges earned by `{user}`"))]
    LoadAwards {
        user: Record<User>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("badge `{badge}` does not exist"))]
    BadgeNotFound {
        badge: Record<Badge>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("badge `{badge}` has not been earned yet"))]
    NotEarned {
        badge: Record<Badge>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("at most {limit} badges can be displayed"))]
    Full {
        limit: usize,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to save the displayed badges of `{user}`"))]
    Save {
        user: Record<User>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("user `{user}` no longer exists"))]
    UserGone {
        user: Record<User>,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for ShowcaseError {
    fn location(&self) -> Location {
        match self {
            ShowcaseError::LoadBadge { location, .. }
            | ShowcaseError::LoadAwards { location, .. }
            | ShowcaseError::BadgeNotFound { location, .. }
            | ShowcaseError::NotEarned { location, .. }
            | ShowcaseError::Full { location, .. }
            | ShowcaseError::Save { location, .. }
            | ShowcaseError::UserGone { location, .. } => *location,
        }
    }
}

/// The ordered badges a user shows on their profile, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Showcase {
    badges: Vec<Record<Badge>>,
}

impl Showcase {
    pub fn new(badges: impl IntoIterator<Item = Record<Badge>>) -> Self {
        let mut showcase = Self::default();

        for badge in badges {
            if showcase.badges.len() < MAX_DISPLAYED && !showcase.contains(&badge) {
                showcase.badges.push(badge);
            }
        }

        showcase
    }

    pub fn contains(&self, badge: &Record<Badge>) -> bool {
        self.badges.contains(badge)
    }

    pub fn badges(&self) -> &[Record<Badge>] {
        &self.badges
    }

    /// Show `badge` if hidden, hide it otherwise. Returns whether it is now displayed.
    pub fn toggle(&mut self, badge: Record<Badge>) -> Result<bool, ShowcaseError> {
        if let Some(index) = self.badges.iter().position(|shown| shown == &badge) {
            self.badges.remove(index);
            return Ok(false);
        }

        ensure!(
            self.badges.len() < MAX_DISPLAYED,
            FullSnafu {
                limit: MAX_DISPLAYED
            }
        );

        self.badges.push(badge);
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseUpdate {
    pub displayed: bool,
    pub badges: Vec<Record<Badge>>,
}

/// Show or hide one of `user`'s earned badges on their profile.
#[instrument(skip(user, db), fields(user = %user.id))]
pub async fn toggle_displayed(
    user: &User,
    badge: &Record<Badge>,
    db: &Database,
) -> Result<ShowcaseUpdate, ShowcaseError> {
    Badge::get(badge, db)
        .await
        .context(LoadBadgeSnafu { badge: badge.clone() })?
        .context(BadgeNotFoundSnafu { badge: badge.clone() })?;

    let earned = BadgeAward::for_user(&user.id, db)
        .await
        .context(LoadAwardsSnafu { user: user.id.clone() })?
        .iter()
        .any(|award| &award.badge == badge);
    ensure!(earned, NotEarnedSnafu { badge: badge.clone() });

    let mut showcase = Showcase::new(user.displayed_badges.iter().cloned());
    let displayed = showcase.toggle(badge.clone())?;

    User::set_displayed_badges(&user.id, showcase.badges(), db)
        .await
        .context(SaveSnafu { user: user.id.clone() })?
        .context(UserGoneSnafu { user: user.id.clone() })?;

    tracing::info!(displayed, badges = ?showcase.badges(), "showcase updated");

    Ok(ShowcaseUpdate {
        displayed,
        badges: showcase.badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::evaluator::fixtures::badge;

    fn id(key: &str) -> Record<Badge> {
        Record::new(key.to_string())
    }

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let showcase = Showcase::new([id("a"), id("b"), id("a"), id("c"), id("d")]);

        assert_eq!(showcase.badges(), &[id("a"), id("b"), id("c")]);
    }

    #[test]
    fn toggling_adds_then_removes() {
        let mut showcase = Showcase::new([id("a"), id("b")]);

        assert!(showcase.toggle(id("c")).unwrap());
        assert_eq!(showcase.badges(), &[id("a"), id("b"), id("c")]);

        assert!(!showcase.toggle(id("a")).unwrap());
        assert_eq!(showcase.badges(), &[id("b"), id("c")]);
    }

    #[test]
    fn a_full_showcase_refuses_more() {
        let mut showcase = Showcase::new([id("a"), id("b"), id("c")]);

        let error = showcase.toggle(id("d")).unwrap_err();

        assert!(matches!(error, ShowcaseError::Full { limit: 3, .. }));
        assert!(!showcase.toggle(id("b")).unwrap(), "removing still works when full");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn only_earned_badges_can_be_displayed() {
        let db = Database::in_memory().await;
        let earned = badge("welcome", 0, Criterion::AccountCreated);
        let locked = badge("night_owl", 1, Criterion::NightVisit);
        db.put(&earned).await.unwrap();
        db.put(&locked).await.unwrap();

        let user = User::new("alice".to_string()).create(&db).await.unwrap();
        BadgeAward::create_all(&[BadgeAward::new(user.id.clone(), earned.id.clone(), now())], &db)
            .await
            .unwrap();

        let update = toggle_displayed(&user, &earned.id, &db).await.unwrap();
        assert!(update.displayed);
        assert_eq!(update.badges, vec![earned.id.clone()]);

        let stored = User::get(&user.id, &db).await.unwrap().unwrap();
        assert_eq!(stored.displayed_badges, vec![earned.id.clone()]);

        let error = toggle_displayed(&stored, &locked.id, &db).await.unwrap_err();
        assert!(matches!(error, ShowcaseError::NotEarned { .. }), "{error}");

        let error = toggle_displayed(&stored, &id("missing"), &db).await.unwrap_err();
        assert!(matches!(error, ShowcaseError::BadgeNotFound { .. }), "{error}");
    }
}
