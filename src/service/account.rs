use snafu::ensure;
use tracing::instrument;

use super::evaluator::BadgeEvaluator;
use crate::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AccountError {
    #[snafu(display("a username cannot be blank"))]
    BlankUsername {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("username `{username}` is already taken"))]
    UsernameTaken {
        username: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to store user `{username}`"))]
    Store {
        username: String,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for AccountError {
    fn location(&self) -> Location {
        match self {
            AccountError::BlankUsername { location }
            | AccountError::UsernameTaken { location, .. }
            | AccountError::Store { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub user: User,
    pub new_badges: Vec<Badge>,
}

/// Create an account and award what a brand new account already deserves.
#[instrument(skip(evaluator, db))]
pub async fn register(
    username: &str,
    evaluator: &BadgeEvaluator,
    db: &Database,
) -> Result<Registration, AccountError> {
    let username = username.trim();
    ensure!(!username.is_empty(), BlankUsernameSnafu);

    // The unique index decides between concurrent registrations.
    let user = match User::new(username.to_string()).create(db).await {
        Ok(user) => user,
        Err(error) if error.is_unique_violation() => {
            return UsernameTakenSnafu { username }.fail();
        }
        Err(error) => return Err(error).context(StoreSnafu { username }),
    };
    tracing::info!(user = %user.id, "registered a new user");

    let new_badges = match evaluator.evaluate(&user.id).await {
        Ok(badges) => badges,
        Err(error) => {
            tracing::error!(%error, location = %error.location(), "badge evaluation failed after a registration");
            Vec::new()
        }
    };

    Ok(Registration { user, new_badges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::evaluator::fixtures::badge;

    #[tokio::test(flavor = "multi_thread")]
    async fn new_accounts_get_the_welcome_badge() {
        let db = Database::in_memory().await;
        db.put(&badge("welcome", 0, Criterion::AccountCreated))
            .await
            .unwrap();
        let evaluator = BadgeEvaluator::new(db.clone(), LocalTime::utc());

        let registration = register("  alice ", &evaluator, &db).await.unwrap();

        assert_eq!(registration.user.username, "alice");
        assert_eq!(registration.new_badges.len(), 1);
        assert_eq!(registration.new_badges[0].id.key(), "welcome");

        let error = register("alice", &evaluator, &db).await.unwrap_err();
        assert!(matches!(error, AccountError::UsernameTaken { .. }), "{error}");

        let error = register("   ", &evaluator, &db).await.unwrap_err();
        assert!(matches!(error, AccountError::BlankUsername { .. }), "{error}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn racing_registrations_leave_one_winner() {
        let db = Database::in_memory().await;
        let evaluator = BadgeEvaluator::new(db.clone(), LocalTime::utc());

        let (first, second) = tokio::join!(
            register("bob", &evaluator, &db),
            register("bob", &evaluator, &db)
        );

        let (won, lost) = match (first, second) {
            (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
            other => panic!("expected exactly one registration to succeed, got {other:?}"),
        };
        assert_eq!(won.user.username, "bob");
        assert!(matches!(lost, AccountError::UsernameTaken { .. }), "{lost}");
    }
}
