use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gist_core::{Article, ArticleStorage, Error, InsertOutcome, RecordingEntry, RecordingStorage, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        author TEXT,
        publishedAt TEXT NOT NULL,
        url TEXT NOT NULL,
        urlToImage TEXT,
        content TEXT,
        extracted_content TEXT NOT NULL,
        summary TEXT NOT NULL,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS voice_recordings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        request_url TEXT NOT NULL UNIQUE,
        voiceover_link TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const ARTICLE_COLUMNS: &str =
    "title, author, publishedAt, url, urlToImage, content, extracted_content, summary";

fn storage_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at the configured --database path"
    }

    async fn open(path: &Path) -> Result<Self> {
        Self::new_with_path(path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| storage_error("Invalid database path", e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let get = |e: sqlx::Error| storage_error("Failed to read article row", e);
    let published_at: String = row.try_get("publishedAt").map_err(get)?;

    Ok(Article {
        title: row.try_get("title").map_err(get)?,
        author: row.try_get("author").map_err(get)?,
        published_at: DateTime::parse_from_rfc3339(&published_at)
            .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))?
            .with_timezone(&Utc),
        url: row.try_get("url").map_err(get)?,
        url_to_image: row.try_get("urlToImage").map_err(get)?,
        content: row.try_get("content").map_err(get)?,
        extracted_content: row.try_get("extracted_content").map_err(get)?,
        summary: row.try_get("summary").map_err(get)?,
    })
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn exists(&self, title: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE title = ?")
            .bind(title)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to look up article", e))?;
        Ok(row.is_some())
    }

    async fn insert_processed(&self, article: &Article) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (title, author, publishedAt, url, urlToImage, content, extracted_content, summary, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(title) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(article.author.as_deref())
        .bind(article.published_at_rfc3339())
        .bind(&article.url)
        .bind(article.url_to_image.as_deref())
        .bind(article.content.as_deref())
        .bind(&article.extracted_content)
        .bind(&article.summary)
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to store article", e))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn enforce_retention(&self, max_count: usize) -> Result<usize> {
        // Single statement: concurrent writers wait on the busy timeout
        // instead of failing a read-to-write lock upgrade.
        let result = sqlx::query(
            r#"
            DELETE FROM articles
            WHERE id NOT IN (
                SELECT id FROM articles
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
            )
            "#,
        )
        .bind(i64::try_from(max_count).unwrap_or(i64::MAX))
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to evict articles", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn get(&self, title: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE title = ?", ARTICLE_COLUMNS))
            .bind(title)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to get article", e))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn get_by_titles(&self, titles: &[String]) -> Result<Vec<Article>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; titles.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM articles WHERE title IN ({})",
            ARTICLE_COLUMNS, placeholders
        );
        let mut query = sqlx::query(&sql);
        for title in titles {
            query = query.bind(title);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to get articles by title", e))?;
        let mut found = rows.iter().map(row_to_article).collect::<Result<Vec<_>>>()?;

        let mut ordered = Vec::with_capacity(found.len());
        for title in titles {
            if let Some(pos) = found.iter().position(|a| &a.title == title) {
                ordered.push(found.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to count articles", e))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl RecordingStorage for SQLiteStorage {
    async fn get_recording(&self, signature: &str) -> Result<Option<RecordingEntry>> {
        let row = sqlx::query(
            "SELECT request_url, voiceover_link, created_at FROM voice_recordings WHERE request_url = ?",
        )
        .bind(signature)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to look up recording", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let get = |e: sqlx::Error| storage_error("Failed to read recording row", e);
        Ok(Some(RecordingEntry {
            signature: row.try_get("request_url").map_err(get)?,
            reference: row.try_get("voiceover_link").map_err(get)?,
            generated_at: row.try_get("created_at").map_err(get)?,
        }))
    }

    async fn upsert_recording(&self, entry: &RecordingEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO voice_recordings (request_url, voiceover_link, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(request_url) DO UPDATE SET
                voiceover_link = excluded.voiceover_link,
                created_at = excluded.created_at
            "#,
        )
        .bind(&entry.signature)
        .bind(&entry.reference)
        .bind(entry.generated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to store recording", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            author: Some("Test Author".to_string()),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            url: format!("https://example.com/{}", title),
            url_to_image: None,
            content: Some("Lead".to_string()),
            extracted_content: "Full text".to_string(),
            summary: "Summary".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        assert!(!storage.exists("Title1").await.unwrap());
        let outcome = storage.insert_processed(&article("Title1")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert!(storage.exists("Title1").await.unwrap());
        assert_eq!(storage.get("Title1").await.unwrap(), Some(article("Title1")));
        assert_eq!(storage.get_db_path(), db_path.as_path());
    }

    #[tokio::test]
    async fn test_sqlite_duplicate_insert_is_noop() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();

        storage.insert_processed(&article("Title1")).await.unwrap();
        let mut changed = article("Title1");
        changed.summary = "Different".to_string();
        let outcome = storage.insert_processed(&changed).await.unwrap();

        assert_eq!(outcome, InsertOutcome::Duplicate);
        assert_eq!(storage.count().await.unwrap(), 1);
        assert_eq!(storage.get("Title1").await.unwrap().unwrap().summary, "Summary");
    }

    #[tokio::test]
    async fn test_sqlite_retention_evicts_oldest_inserted() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();

        // Publication order is the reverse of insertion order.
        for i in 0..4 {
            let mut a = article(&format!("Title{}", i));
            a.published_at = Utc.with_ymd_and_hms(2024, 5, 10 - i, 0, 0, 0).unwrap();
            storage.insert_processed(&a).await.unwrap();
        }
        assert_eq!(storage.enforce_retention(3).await.unwrap(), 1);

        assert_eq!(storage.count().await.unwrap(), 3);
        assert!(!storage.exists("Title0").await.unwrap());
        for title in ["Title1", "Title2", "Title3"] {
            assert!(storage.exists(title).await.unwrap());
        }
        assert_eq!(storage.enforce_retention(3).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sqlite_concurrent_writers_and_retention() {
        let temp_dir = tempdir().unwrap();
        let storage = Arc::new(SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|worker| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    for i in 0..40 {
                        storage
                            .insert_processed(&article(&format!("Title{}-{}", worker, i)))
                            .await?;
                        storage.enforce_retention(10).await?;
                    }
                    Ok::<_, Error>(())
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(storage.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_sqlite_get_by_titles_keeps_request_order() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();
        storage.insert_processed(&article("Title1")).await.unwrap();
        storage.insert_processed(&article("Title2")).await.unwrap();

        let titles = vec!["Title2".to_string(), "Missing".to_string(), "Title1".to_string()];
        let found = storage.get_by_titles(&titles).await.unwrap();
        let found: Vec<_> = found.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(found, vec!["Title2", "Title1"]);
        assert!(storage.get_by_titles(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_recording_upsert_overwrites() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();
        let signature = "/news/full-pipeline?count=5";

        assert!(storage.get_recording(signature).await.unwrap().is_none());
        let first = RecordingEntry {
            signature: signature.to_string(),
            reference: "https://cdn.example.com/1.mp3".to_string(),
            generated_at: 100,
        };
        storage.upsert_recording(&first).await.unwrap();
        let second = RecordingEntry {
            reference: "https://cdn.example.com/2.mp3".to_string(),
            generated_at: 5_000,
            ..first.clone()
        };
        storage.upsert_recording(&second).await.unwrap();

        assert_eq!(storage.get_recording(signature).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_sqlite_reopen_keeps_data() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        {
            let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
            storage.insert_processed(&article("Title1")).await.unwrap();
        }
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
        assert!(storage.exists("Title1").await.unwrap());
    }
}
