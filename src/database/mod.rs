use std::ops::Deref;

use snafu::{Location, ResultExt, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;
use url::Url;

use crate::config::SurrealConfig;

/// Typed operations on the `counters` table.
pub mod counters;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseError {
    #[snafu(display("failed to query the database at {location}: {source}"))]
    DatabaseQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to deserialize the database response at {location}: {source}"))]
    DatabaseDeserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to parse the database response at {location}: response is empty"))]
    EmptyQuery {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    DatabaseConnection {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Handle to the counter record store.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    pub async fn connect(config: &SurrealConfig) -> Result<Self> {
        let database = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .context(DatabaseConnectionSnafu {
                url: config.url.clone(),
            })?;

        if let Some(credentials) = &config.credentials {
            database
                .signin(auth::Root {
                    username: &credentials.username,
                    password: &credentials.password,
                })
                .await
                .context(DatabaseConnectionSnafu {
                    url: config.url.clone(),
                })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(DatabaseConnectionSnafu {
                url: config.url.clone(),
            })?;

        Ok(Self { database })
    }

    /// An isolated in-memory store for tests.
    #[cfg(test)]
    pub(crate) async fn memory() -> Self {
        let database = surrealdb::engine::any::connect("mem://")
            .await
            .expect("connect to the in-memory engine");

        database
            .use_ns("test")
            .use_db("test")
            .await
            .expect("select the test namespace");

        Self { database }
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
