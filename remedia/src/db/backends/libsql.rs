use async_trait::async_trait;

use crate::db::connection::Database;
use crate::db::repository::{RemedyRepository, SymptomRepository};
use crate::db::schema::{missing_tables, REMEDY_TABLES};
use crate::db::traits::{CorpusStore, RemedyStore};
use crate::error::{RemediaError, Result};
use crate::models::{RemedyRecord, SymptomCorpusEntry};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RemedyStore for LibSqlBackend {
    async fn remedies_for(&self, symptom_id: i64) -> Result<Vec<RemedyRecord>> {
        let conn = self.db.connect()?;
        RemedyRepository::for_symptom(&conn, symptom_id).await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect().map_err(|e| {
            RemediaError::ResourceUnavailable(format!("Remedy store unreachable: {e}"))
        })?;

        let missing = missing_tables(&conn, &REMEDY_TABLES).await.map_err(|e| {
            RemediaError::ResourceUnavailable(format!("Remedy store unreachable: {e}"))
        })?;

        if !missing.is_empty() {
            return Err(RemediaError::ResourceUnavailable(format!(
                "Remedy store is missing tables: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CorpusStore for LibSqlBackend {
    async fn load_corpus(&self) -> Result<Vec<SymptomCorpusEntry>> {
        let conn = self.db.connect()?;

        if !missing_tables(&conn, &["symptoms"]).await?.is_empty() {
            return Err(RemediaError::ResourceUnavailable(
                "Reference database has no symptoms table".to_string(),
            ));
        }

        SymptomRepository::load_all(&conn).await
    }
}
