use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::instrument;
use url::Url;

/// Helper trait for executing arbitrary SurrealQL queries.
pub mod query;

/// Typed record identifiers.
pub mod record;

/// Macros for defining table methods.
pub mod macros;

pub use query::{Bindings, Sql};
pub use record::Record;
pub use surrealdb::sql::Thing;

use crate::Located;

const SCHEMA: &str = include_str!("../assets/schema.surrealql");

const CONNECT_ATTEMPTS: usize = 5;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseConnectionError {
    #[snafu(display("cannot connect to the database `{url}`: {source}"))]
    Connect {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot sign in to the database `{url}` as `{username}`: {source}"))]
    SignIn {
        url: Url,
        username: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot use namespace `{namespace}` and database `{database}`: {source}"))]
    SelectDatabase {
        namespace: String,
        database: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to apply the database schema: {source}"))]
    Schema {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseQueryError {
    #[snafu(display("failed to execute the query at {location}: {source}"))]
    MalformedQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to deserialize the database response at {location}: {source}"))]
    Deserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("expected a result at {location}, but the response is empty"))]
    NoResults {
        #[snafu(implicit)]
        location: Location,
    },
}

impl DatabaseQueryError {
    /// Whether the query was rejected by a `UNIQUE` index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseQueryError::MalformedQuery { source, .. } => match source {
                surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. }) => true,
                // Remote engines only hand back the message.
                other => other.to_string().contains("already contains"),
            },
            DatabaseQueryError::Deserialize { .. } | DatabaseQueryError::NoResults { .. } => false,
        }
    }
}

impl Located for DatabaseQueryError {
    fn location(&self) -> Location {
        match self {
            DatabaseQueryError::MalformedQuery { location, .. }
            | DatabaseQueryError::Deserialize { location, .. }
            | DatabaseQueryError::NoResults { location } => *location,
        }
    }
}

impl Located for DatabaseConnectionError {
    fn location(&self) -> Location {
        match self {
            DatabaseConnectionError::Connect { location, .. }
            | DatabaseConnectionError::SignIn { location, .. }
            | DatabaseConnectionError::SelectDatabase { location, .. }
            | DatabaseConnectionError::Schema { location, .. } => *location,
        }
    }
}

/// Represents a table whose rows are addressed by a [Record].
pub trait Table {
    /// Returns the ID of the record.
    fn id(&self) -> &Thing;

    /// Returns the name of the table associated with the record.
    fn table() -> &'static str;
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url")]
    pub url: Url,
    #[serde(rename = "surreal_namespace")]
    pub namespace: String,
    #[serde(rename = "surreal_database")]
    pub database: String,
    #[serde(rename = "surreal_username")]
    pub username: Option<String>,
    #[serde(rename = "surreal_password")]
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// Connects to the database and applies the schema, retrying with an exponential backoff when the server is not reachable yet.
    #[instrument(skip(self), fields(url = %self.url, namespace = %self.namespace, database = %self.database))]
    pub async fn connect(&self) -> Result<Database, DatabaseConnectionError> {
        let strategy = ExponentialBackoff::from_millis(100)
            .map(jitter)
            .take(CONNECT_ATTEMPTS);

        Retry::spawn(strategy, || async {
            let result = self.connect_once().await;
            if let Err(error) = &result {
                tracing::warn!(%error, "could not connect to the database");
            }
            result
        })
        .await
    }

    async fn connect_once(&self) -> Result<Database, DatabaseConnectionError> {
        let db = surrealdb::engine::any::connect(self.url.as_str())
            .await
            .context(ConnectSnafu {
                url: self.url.clone(),
            })?;

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            db.signin(auth::Root { username, password })
                .await
                .context(SignInSnafu {
                    url: self.url.clone(),
                    username: username.clone(),
                })?;
        }

        db.use_ns(&self.namespace)
            .use_db(&self.database)
            .await
            .context(SelectDatabaseSnafu {
                namespace: self.namespace.clone(),
                database: self.database.clone(),
            })?;

        let database = Database::new(db);
        database.migrate().await?;

        tracing::info!("connected to the database");
        Ok(database)
    }
}

/// Represents a database wrapper.
///
/// This struct provides a wrapper around a database connection, cheap to clone and shared by every service.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    pub fn new(database: Surreal<Any>) -> Self {
        Self { database }
    }

    /// Define the tables and unique indexes. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), DatabaseConnectionError> {
        self.database
            .query(SCHEMA)
            .await
            .context(SchemaSnafu)?
            .check()
            .context(SchemaSnafu)?;

        Ok(())
    }

    /// Replace whatever is stored under the row's id with `row`, creating it if needed.
    pub async fn put<T>(&self, row: &T) -> Result<(), DatabaseQueryError>
    where
        T: Table + serde::Serialize,
    {
        self.sql("BEGIN TRANSACTION; DELETE $id; CREATE $id CONTENT $content; COMMIT TRANSACTION;")
            .bind(("id", row.id()))
            .bind(("content", row))
            .execute()
            .await?;

        Ok(())
    }

    /// A fresh in-memory database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> Database {
        let config = DatabaseConfig {
            url: Url::parse("mem://").expect("valid in-memory url"),
            namespace: "test".to_string(),
            database: "test".to_string(),
            username: None,
            password: None,
        };

        config
            .connect_once()
            .await
            .expect("connect to the in-memory database")
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
