use libsql::{params, Connection};

use crate::error::{RemediaError, Result};
use crate::models::SymptomCorpusEntry;

pub struct SymptomRepository;

impl SymptomRepository {
    pub async fn load_all(conn: &Connection) -> Result<Vec<SymptomCorpusEntry>> {
        let mut rows = conn
            .query(
                "SELECT id, category, path, vector_extract(embedding) FROM symptoms ORDER BY id",
                (),
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: i64 = row.get(0)?;
            let raw_embedding: String = row.get(3)?;
            let embedding = parse_vector(&raw_embedding).map_err(|e| {
                RemediaError::ResourceUnavailable(format!(
                    "Symptom {id} has an unreadable embedding: {e}"
                ))
            })?;

            entries.push(SymptomCorpusEntry {
                id,
                category: row.get(1)?,
                path: row.get(2)?,
                embedding,
            });
        }

        Ok(entries)
    }

    pub async fn insert(conn: &Connection, entry: &SymptomCorpusEntry) -> Result<()> {
        let embedding_json = serde_json::to_string(&entry.embedding)?;

        conn.execute(
            "INSERT OR REPLACE INTO symptoms (id, category, path, embedding) VALUES (?1, ?2, ?3, vector32(?4))",
            params![entry.id, entry.category.clone(), entry.path.clone(), embedding_json],
        )
        .await?;

        Ok(())
    }
}

/// `vector_extract` renders vectors as `[0.1,0.2,...]`.
fn parse_vector(raw: &str) -> serde_json::Result<Vec<f32>> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extracted_vector_text() {
        assert_eq!(parse_vector("[0.5,-1,0]").unwrap(), vec![0.5, -1.0, 0.0]);
        assert!(parse_vector("not a vector").is_err());
    }
}
