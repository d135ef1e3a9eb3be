use std::sync::Arc;

use libsql::{Builder, Connection};

use crate::config::DatabaseConfig;
use crate::error::{RemediaError, Result};

use super::schema;

/// Where the reference database lives, derived from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location<'a> {
    /// `file:` URL or a bare path.
    Local(&'a str),
    /// Remote libsql server, queried over the network.
    Remote(&'a str),
    /// Remote libsql server mirrored into a local file.
    Replica { url: &'a str, local_path: &'a str },
}

impl<'a> Location<'a> {
    fn of(config: &'a DatabaseConfig) -> Self {
        let url = config.url.as_str();
        let remote = url.starts_with("libsql://") || url.starts_with("https://");

        match (remote, config.local_path.as_deref()) {
            (true, Some(local_path)) => Self::Replica { url, local_path },
            (true, None) => Self::Remote(url),
            (false, _) => Self::Local(url.strip_prefix("file:").unwrap_or(url)),
        }
    }
}

/// Handle to the reference database holding the repertory tables.
///
/// Opening never creates tables: the database is read-only reference data
/// shipped with the deployment.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
}

impl Database {
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let token = || config.auth_token.clone().unwrap_or_default();

        let db = match Location::of(config) {
            Location::Local(path) => Builder::new_local(path).build().await?,
            Location::Remote(url) => Builder::new_remote(url.to_string(), token()).build().await?,
            Location::Replica { url, local_path } => {
                let db = Builder::new_remote_replica(local_path, url.to_string(), token())
                    .build()
                    .await
                    .map_err(|e| {
                        RemediaError::ResourceUnavailable(format!(
                            "Failed to open replica of {url} at {local_path}: {e}"
                        ))
                    })?;

                // A fresh replica is empty until the first sync.
                let replicated = db.sync().await.map_err(|e| {
                    RemediaError::ResourceUnavailable(format!(
                        "Failed to sync replica of {url}: {e}"
                    ))
                })?;
                tracing::info!(sync = ?replicated, "Reference database replica synced");
                db
            }
        };

        tracing::info!(url = %config.url, "Reference database opened");
        Ok(Self { db: Arc::new(db) })
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    /// Create the repertory tables if missing. Used to build fresh reference databases.
    pub async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::init_schema(&conn).await
    }
}
