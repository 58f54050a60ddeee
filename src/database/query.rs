use serde::de::DeserializeOwned;
use snafu::{OptionExt as _, ResultExt as _};
use surrealdb::opt::{IntoQuery, QueryResult};

use super::*;

/// An extension trait that allows you to execute raw SQL queries. Parameters can be bound using the [Bindings::bind] method which takes any serializable data structure.
///
/// # Example
/// ```ignore
/// let states: Vec<StationState> = database.sql("SELECT * FROM station_states WHERE user = $user")
///     .bind(("user", &user))
///     .fetch_first()
///     .await?;
/// ```
pub trait Sql {
    fn sql(&self, query: impl IntoQuery) -> Bindings<'_>;
}

impl Sql for Database {
    fn sql(&self, query: impl IntoQuery) -> Bindings<'_> {
        Bindings {
            query: self.database.query(query),
        }
    }
}

#[derive(Debug)]
pub struct Bindings<'a> {
    query: surrealdb::method::Query<'a, Any>,
}

impl Bindings<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    /// Execute the statements and fail if any of them failed.
    ///
    /// A multi-statement transaction either commits as a whole or surfaces its first error here.
    pub async fn execute(self) -> Result<surrealdb::Response, DatabaseQueryError> {
        let response = self
            .query
            .await
            .context(MalformedQuerySnafu)?
            .check()
            .context(MalformedQuerySnafu)?;

        tracing::trace!(statements = response.num_statements(), "executed query");
        Ok(response)
    }

    /// Execute the query and return the first statement's result as a deserialized value.
    pub async fn fetch_first<T: DeserializeOwned>(self) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<T>,
    {
        let mut statements = self.execute().await?;
        let result = statements.take::<T>(0).context(DeserializeSnafu)?;
        Ok(result)
    }

    /// Like [Bindings::fetch_first], but an empty result is an error.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<Option<T>>,
    {
        self.fetch_first::<Option<T>>()
            .await?
            .context(NoResultsSnafu)
    }
}
