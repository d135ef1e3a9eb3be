use libsql::{params, Connection};

use crate::error::Result;
use crate::models::RemedyRecord;

pub struct RemedyRepository;

impl RemedyRepository {
    pub async fn for_symptom(conn: &Connection, symptom_id: i64) -> Result<Vec<RemedyRecord>> {
        let mut rows = conn
            .query(
                r#"
                SELECT remedies.remedy_abbreviation, remedies.description, symptom_remedies.degree
                FROM symptom_remedies
                JOIN remedies
                  ON symptom_remedies.remedy_abbreviation = remedies.remedy_abbreviation
                WHERE symptom_remedies.symptom_id = ?1
                ORDER BY symptom_remedies.degree DESC, remedies.remedy_abbreviation ASC
                "#,
                params![symptom_id],
            )
            .await?;

        let mut remedies = Vec::new();
        while let Some(row) = rows.next().await? {
            remedies.push(RemedyRecord {
                abbreviation: row.get(0)?,
                description: row.get(1)?,
                degree: row.get(2)?,
            });
        }

        Ok(remedies)
    }

    pub async fn insert_remedy(conn: &Connection, abbreviation: &str, description: &str) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO remedies (remedy_abbreviation, description) VALUES (?1, ?2)",
            params![abbreviation, description],
        )
        .await?;
        Ok(())
    }

    pub async fn link(conn: &Connection, symptom_id: i64, abbreviation: &str, degree: i64) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO symptom_remedies (symptom_id, remedy_abbreviation, degree) VALUES (?1, ?2, ?3)",
            params![symptom_id, abbreviation, degree],
        )
        .await?;
        Ok(())
    }
}
