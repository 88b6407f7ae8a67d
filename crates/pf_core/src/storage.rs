use async_trait::async_trait;

use crate::types::{ProcessedArticle, ProcessingResult, Profile, UserId};
use crate::Result;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 200;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn page_size(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_SIZE)
}

#[async_trait]
pub trait ProcessedArticleStore: Send + Sync {
    /// Whether `(user_id, url)` has already been processed.
    async fn exists(&self, user_id: UserId, url: &str) -> Result<bool>;

    /// Insert all records or none. Records whose `(user_id, url)` is already
    /// present are ignored.
    async fn insert_batch(&self, records: &[ProcessedArticle]) -> Result<()>;

    /// A user's articles, newest first.
    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ProcessedArticle>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>>;

    /// Create or replace the user's interests description.
    async fn save_profile(&self, user_id: UserId, interests_description: &str) -> Result<Profile>;
}

#[async_trait]
pub trait ProcessingResultStore: Send + Sync {
    async fn store_result(&self, result: &ProcessingResult) -> Result<()>;

    /// A user's thread results, newest first.
    async fn list_results(&self, user_id: UserId, limit: usize) -> Result<Vec<ProcessingResult>>;
}
