use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pf_core::storage::page_size;
use pf_core::{
    Error, ProcessedArticle, ProcessedArticleStore, ProcessingResult, ProcessingResultStore,
    Profile, ProfileStore, Result, UserId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id INTEGER PRIMARY KEY,
        interests_description TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS processed_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        url TEXT NOT NULL,
        title TEXT,
        source_blog TEXT,
        fits_profile INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS processed_articles_user_url
        ON processed_articles (user_id, url)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS processing_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        url TEXT NOT NULL,
        status TEXT NOT NULL,
        tweets TEXT NOT NULL,
        tweet_count INTEGER NOT NULL,
        error_message TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(column);
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", column, e)))
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./pfit.db"
    }

    async fn open_default() -> Result<Self> {
        Self::new_with_path(Path::new("pfit.db")).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::debug!(path = %db_path.display(), "SQLite storage ready");
        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    fn article_from_row(row: &SqliteRow) -> Result<ProcessedArticle> {
        Ok(ProcessedArticle {
            user_id: row.get("user_id"),
            url: row.get("url"),
            title: row.get("title"),
            source_blog: row.get("source_blog"),
            fits_profile: row.get::<Option<bool>, _>("fits_profile"),
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }

    fn result_from_row(row: &SqliteRow) -> Result<ProcessingResult> {
        let tweets: String = row.get("tweets");
        let status: String = row.get("status");
        Ok(ProcessingResult {
            user_id: row.get("user_id"),
            url: row.get("url"),
            status: status.parse()?,
            tweets: serde_json::from_str(&tweets)?,
            tweet_count: row.get::<i64, _>("tweet_count") as usize,
            error_message: row.get("error_message"),
            created_at: parse_timestamp(row, "created_at")?,
        })
    }
}

#[async_trait]
impl ProcessedArticleStore for SQLiteStorage {
    async fn exists(&self, user_id: UserId, url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM processed_articles WHERE user_id = ? AND url = ?")
            .bind(user_id)
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to check processed article"))?;
        Ok(row.is_some())
    }

    async fn insert_batch(&self, records: &[ProcessedArticle]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Dropping the transaction without commit rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO processed_articles
                (user_id, url, title, source_blog, fits_profile, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (user_id, url) DO NOTHING
                "#,
            )
            .bind(record.user_id)
            .bind(&record.url)
            .bind(record.title.as_deref())
            .bind(record.source_blog.as_deref())
            .bind(record.fits_profile)
            .bind(timestamp(&record.created_at))
            .bind(timestamp(&record.updated_at))
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert processed article"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit processed articles"))?;
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ProcessedArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM processed_articles
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(page_size(limit) as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to list processed articles"))?;

        rows.iter().map(Self::article_from_row).collect()
    }
}

#[async_trait]
impl ProfileStore for SQLiteStorage {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to load profile"))?;

        match row {
            Some(row) => Ok(Some(Profile {
                user_id: row.get("user_id"),
                interests_description: row.get("interests_description"),
                created_at: parse_timestamp(&row, "created_at")?,
                updated_at: parse_timestamp(&row, "updated_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn save_profile(&self, user_id: UserId, interests_description: &str) -> Result<Profile> {
        let now = timestamp(&Utc::now());
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, interests_description, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                interests_description = excluded.interests_description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(interests_description)
        .bind(&now)
        .bind(&now)
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to save profile"))?;

        self.get_profile(user_id)
            .await?
            .ok_or_else(|| Error::Storage(format!("Profile {} vanished after save", user_id)))
    }
}

#[async_trait]
impl ProcessingResultStore for SQLiteStorage {
    async fn store_result(&self, result: &ProcessingResult) -> Result<()> {
        let tweets = serde_json::to_string(&result.tweets)?;
        sqlx::query(
            r#"
            INSERT INTO processing_results
            (user_id, url, status, tweets, tweet_count, error_message, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.user_id)
        .bind(&result.url)
        .bind(result.status.as_str())
        .bind(tweets)
        .bind(result.tweet_count as i64)
        .bind(result.error_message.as_deref())
        .bind(timestamp(&result.created_at))
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to store processing result"))?;
        Ok(())
    }

    async fn list_results(&self, user_id: UserId, limit: usize) -> Result<Vec<ProcessingResult>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM processing_results
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(page_size(limit) as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to list processing results"))?;

        rows.iter().map(Self::result_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::ClassificationOutcome;
    use tempfile::tempdir;

    fn record(user_id: UserId, outcome: &ClassificationOutcome) -> ProcessedArticle {
        ProcessedArticle::from_outcome(user_id, Some("http://blog"), outcome)
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        let records = vec![
            record(1, &ClassificationOutcome::success("http://a/1", "T1", true)),
            record(1, &ClassificationOutcome::error("http://a/2", "T2", "boom")),
        ];
        storage.insert_batch(&records).await.unwrap();

        assert!(storage.exists(1, "http://a/1").await.unwrap());
        assert!(!storage.exists(2, "http://a/1").await.unwrap());

        let listed = storage.list_by_user(1, 50, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].url, "http://a/2");
        assert_eq!(listed[0].fits_profile, None);
        assert_eq!(listed[1].fits_profile, Some(true));
        assert_eq!(listed[1].source_blog.as_deref(), Some("http://blog"));
    }

    #[tokio::test]
    async fn conflicting_rows_do_not_fail_the_batch() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let first = record(1, &ClassificationOutcome::success("http://a/1", "T1", true));
        storage.insert_batch(&[first.clone()]).await.unwrap();

        let second = record(1, &ClassificationOutcome::success("http://a/2", "T2", false));
        storage.insert_batch(&[first, second]).await.unwrap();

        assert_eq!(storage.list_by_user(1, 50, 0).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_the_whole_batch() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        sqlx::query(
            r#"
            CREATE TRIGGER reject_second BEFORE INSERT ON processed_articles
            WHEN NEW.url = 'http://a/2'
            BEGIN SELECT RAISE(ABORT, 'boom'); END
            "#,
        )
        .execute(&*storage.pool)
        .await
        .unwrap();

        let records = vec![
            record(1, &ClassificationOutcome::success("http://a/1", "T1", true)),
            record(1, &ClassificationOutcome::success("http://a/2", "T2", false)),
        ];
        let err = storage.insert_batch(&records).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)), "unexpected error: {:?}", err);

        assert!(storage.list_by_user(1, 50, 0).await.unwrap().is_empty());
        assert!(!storage.exists(1, "http://a/1").await.unwrap());
    }

    #[tokio::test]
    async fn profiles_and_results_round_trip() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("nested/test.db"))
            .await
            .unwrap();

        let created = storage.save_profile(3, "analytics").await.unwrap();
        let updated = storage.save_profile(3, "analytics and AI").await.unwrap();
        assert_eq!(created.created_at, updated.created_at);
        assert_eq!(updated.interests_description, "analytics and AI");

        let tweets = vec!["first".to_string(), "second".to_string()];
        storage
            .store_result(&ProcessingResult::success(3, "http://a/1", tweets.clone()))
            .await
            .unwrap();
        let results = storage.list_results(3, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tweets, tweets);
        assert_eq!(results[0].tweet_count, 2);
    }
}
