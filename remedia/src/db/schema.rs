use libsql::Connection;

use crate::error::Result;

/// Tables the remedy lookup needs.
pub const REMEDY_TABLES: [&str; 2] = ["remedies", "symptom_remedies"];

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS remedies (
            remedy_abbreviation TEXT PRIMARY KEY,
            description TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS symptom_remedies (
            symptom_id INTEGER NOT NULL,
            remedy_abbreviation TEXT NOT NULL,
            degree INTEGER NOT NULL,
            PRIMARY KEY (symptom_id, remedy_abbreviation),
            FOREIGN KEY (remedy_abbreviation) REFERENCES remedies(remedy_abbreviation)
        );

        CREATE INDEX IF NOT EXISTS idx_symptom_remedies_symptom_id
            ON symptom_remedies(symptom_id);

        -- embedding holds a float32 vector blob as written by vector32()
        CREATE TABLE IF NOT EXISTS symptoms (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            path TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_symptoms_category ON symptoms(category);
        "#,
    )
    .await?;

    Ok(())
}

pub async fn missing_tables(conn: &Connection, tables: &[&str]) -> Result<Vec<String>> {
    let mut missing = Vec::new();

    for table in tables {
        let mut rows = conn
            .query(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [*table],
            )
            .await?;

        if rows.next().await?.is_none() {
            missing.push(table.to_string());
        }
    }

    Ok(missing)
}
