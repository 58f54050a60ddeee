use crate::prelude::*;
use crate::{define_relation, table};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct User {
    #[new(default)]
    pub id: Record<User>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub username: String,
    /// Earned badges picked for the profile, in display order.
    #[new(default)]
    #[serde(default)]
    pub displayed_badges: Vec<Record<Badge>>,
}

table!("users": User = id);

impl User {
    pub async fn create(&self, db: &Database) -> Result<User, DatabaseQueryError> {
        db.sql("CREATE $id CONTENT $content RETURN AFTER")
            .bind(("id", &self.id))
            .bind(("content", self))
            .fetch_one()
            .await
    }
}

define_relation! {
    User > get(id: &Record<User>) > Option<User>
        where "SELECT * FROM users WHERE id = $id LIMIT 1"
}

define_relation! {
    User > set_displayed_badges(id: &Record<User>, badges: &[Record<Badge>]) > Option<User>
        where "UPDATE $id SET displayed_badges = $badges RETURN AFTER"
}
