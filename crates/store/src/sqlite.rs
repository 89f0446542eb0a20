//! SQLite-backed analysis repository.
//!
//! The repository is opened for exactly one schema: `word_analyses` (one row
//! per word) or `image_analyses` (one row per upload, results as JSON).
//! Records of the other shape are rejected.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::Arc;

use wordlens_core::{
    config::PersistenceMode,
    traits::AnalysisRepository,
    types::AnalysisRecord,
    Error, Result,
};

/// Schema a [`SqliteAnalysisRepository`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteSchema {
    PerWord,
    PerImage,
}

impl SqliteSchema {
    /// Schema for a persistence mode, `None` when persistence is off.
    pub fn for_mode(mode: PersistenceMode) -> Option<Self> {
        match mode {
            PersistenceMode::None => None,
            PersistenceMode::PerWord => Some(Self::PerWord),
            PersistenceMode::PerImage => Some(Self::PerImage),
        }
    }

    fn table(self) -> &'static str {
        match self {
            Self::PerWord => "word_analyses",
            Self::PerImage => "image_analyses",
        }
    }

    fn ddl(self) -> &'static str {
        match self {
            Self::PerWord => {
                "CREATE TABLE IF NOT EXISTS word_analyses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    word TEXT NOT NULL,
                    definition TEXT NOT NULL,
                    sample_sentence TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                )"
            }
            Self::PerImage => {
                "CREATE TABLE IF NOT EXISTS image_analyses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    image_path TEXT NOT NULL,
                    analysis_data TEXT NOT NULL, -- JSON array
                    created_at INTEGER NOT NULL
                )"
            }
        }
    }
}

/// SQLite analysis repository.
pub struct SqliteAnalysisRepository {
    conn: Arc<tokio::sync::Mutex<Connection>>,
    schema: SqliteSchema,
}

impl SqliteAnalysisRepository {
    /// Open (or create) a database file at `path`.
    pub fn new(path: impl AsRef<std::path::Path>, schema: SqliteSchema) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::persistence(format!("DB error: {}", e)))?;
        Self::with_connection(conn, schema)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(schema: SqliteSchema) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::persistence(format!("DB error: {}", e)))?;
        Self::with_connection(conn, schema)
    }

    fn with_connection(conn: Connection, schema: SqliteSchema) -> Result<Self> {
        conn.execute(schema.ddl(), [])
            .map_err(|e| Error::persistence(format!("Schema error: {}", e)))?;

        Ok(Self {
            conn: Arc::new(tokio::sync::Mutex::new(conn)),
            schema,
        })
    }

    /// Schema this repository writes to.
    pub fn schema(&self) -> SqliteSchema {
        self.schema
    }

    /// Number of rows in the active table.
    pub async fn count(&self) -> Result<usize> {
        let conn = self.conn.clone();
        let sql = format!("SELECT COUNT(*) FROM {}", self.schema.table());

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let count: i64 = conn
                .query_row(&sql, [], |row| row.get(0))
                .map_err(|e| Error::persistence(format!("Count error: {}", e)))?;
            Ok(count as usize)
        })
        .await
        .map_err(|e| Error::internal(e.to_string()))?
    }
}

#[async_trait]
impl AnalysisRepository for SqliteAnalysisRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<()> {
        let conn = self.conn.clone();
        let created_at = chrono::Utc::now().timestamp();

        match (self.schema, record) {
            (SqliteSchema::PerWord, AnalysisRecord::Words(items)) => {
                let rows: Vec<(String, String, String)> = items
                    .iter()
                    .map(|i| (i.word(), i.definition(), i.sample_sentence()))
                    .collect();

                tokio::task::spawn_blocking(move || {
                    let mut conn = conn.blocking_lock();
                    let tx = conn
                        .transaction()
                        .map_err(|e| Error::persistence(format!("Transaction error: {}", e)))?;
                    for (word, definition, sample_sentence) in &rows {
                        tx.execute(
                            "INSERT INTO word_analyses (word, definition, sample_sentence, created_at)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![word, definition, sample_sentence, created_at],
                        )
                        .map_err(|e| Error::persistence(format!("Insert error: {}", e)))?;
                    }
                    tx.commit()
                        .map_err(|e| Error::persistence(format!("Commit error: {}", e)))?;
                    Ok(())
                })
                .await
                .map_err(|e| Error::internal(e.to_string()))?
            }
            (SqliteSchema::PerImage, AnalysisRecord::Image { image_path, analysis }) => {
                let image_path = image_path.clone();
                let analysis_json = serde_json::to_string(analysis)?;

                tokio::task::spawn_blocking(move || {
                    let conn = conn.blocking_lock();
                    conn.execute(
                        "INSERT INTO image_analyses (image_path, analysis_data, created_at)
                         VALUES (?1, ?2, ?3)",
                        params![image_path, analysis_json, created_at],
                    )
                    .map_err(|e| Error::persistence(format!("Insert error: {}", e)))?;
                    Ok(())
                })
                .await
                .map_err(|e| Error::internal(e.to_string()))?
            }
            (schema, _) => Err(Error::persistence(format!(
                "record shape does not match the {} table",
                schema.table()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlens_core::types::AnalysisResult;

    fn sample() -> Vec<AnalysisResult> {
        vec![
            AnalysisResult::new("cat", "a small domesticated carnivorous mammal", "The cat slept on the windowsill."),
            AnalysisResult::new("ball", "a round object", "The dog chased the ball."),
        ]
    }

    #[tokio::test]
    async fn test_per_word_inserts_one_row_per_item() {
        let repo = SqliteAnalysisRepository::open_in_memory(SqliteSchema::PerWord).unwrap();
        repo.insert(&AnalysisRecord::Words(sample())).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_per_image_inserts_one_row() {
        let repo = SqliteAnalysisRepository::open_in_memory(SqliteSchema::PerImage).unwrap();
        let record = AnalysisRecord::Image {
            image_path: "5f0c-cat.png".into(),
            analysis: sample(),
        };
        repo.insert(&record).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mismatched_record_is_rejected() {
        let repo = SqliteAnalysisRepository::open_in_memory(SqliteSchema::PerImage).unwrap();
        let err = repo.insert(&AnalysisRecord::Words(sample())).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceFailure(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[test]
    fn test_schema_for_mode() {
        assert_eq!(SqliteSchema::for_mode(PersistenceMode::None), None);
        assert_eq!(SqliteSchema::for_mode(PersistenceMode::PerWord), Some(SqliteSchema::PerWord));
        assert_eq!(SqliteSchema::for_mode(PersistenceMode::PerImage), Some(SqliteSchema::PerImage));
    }
}
