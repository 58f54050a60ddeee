use crate::prelude::*;
use crate::{define_relation, table};

/// A badge earned by a user. Awards are never revoked.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct BadgeAward {
    #[new(default)]
    pub id: Record<BadgeAward>,
    pub user: Record<User>,
    pub badge: Record<Badge>,
    pub awarded_at: Timestamp,
}

table!("badge_awards": BadgeAward = id);

impl BadgeAward {
    /// Store every award in one transaction: either all of them are recorded or none is.
    #[tracing::instrument(level = "debug", skip_all, fields(count = awards.len()))]
    pub async fn create_all(awards: &[BadgeAward], db: &Database) -> Result<(), DatabaseQueryError> {
        if awards.is_empty() {
            return Ok(());
        }

        let mut query = String::from("BEGIN TRANSACTION;\n");
        for index in 0..awards.len() {
            query.push_str(&format!("CREATE badge_awards CONTENT $award_{index};\n"));
        }
        query.push_str("COMMIT TRANSACTION;");

        let bindings = awards
            .iter()
            .enumerate()
            .fold(db.sql(query), |bindings, (index, award)| {
                bindings.bind((format!("award_{index}"), award))
            });

        bindings.execute().await?;
        Ok(())
    }
}

define_relation! {
    BadgeAward > for_user(user: &Record<User>) > Vec<BadgeAward>
        where "SELECT * FROM badge_awards WHERE user = $user"
}
