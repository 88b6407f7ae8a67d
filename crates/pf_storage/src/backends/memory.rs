use async_trait::async_trait;
use chrono::Utc;
use pf_core::storage::page_size;
use pf_core::{
    ProcessedArticle, ProcessedArticleStore, ProcessingResult, ProcessingResultStore, Profile,
    ProfileStore, Result, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    keys: HashSet<(UserId, String)>,
    articles: Vec<ProcessedArticle>,
    profiles: HashMap<UserId, Profile>,
    results: Vec<ProcessingResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_batch(&mut self, records: &[ProcessedArticle]) {
        for record in records {
            let key = (record.user_id, record.url.clone());
            if self.keys.insert(key) {
                self.articles.push(record.clone());
            }
        }
    }

    fn list_by_user(&self, user_id: UserId, limit: usize, offset: usize) -> Vec<ProcessedArticle> {
        let mut rows: Vec<(usize, &ProcessedArticle)> = self
            .articles
            .iter()
            .enumerate()
            .filter(|(_, a)| a.user_id == user_id)
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        rows.into_iter()
            .skip(offset)
            .take(page_size(limit))
            .map(|(_, a)| a.clone())
            .collect()
    }
}

/// Process-local storage. Everything is lost on exit.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open_default() -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ProcessedArticleStore for InMemoryStorage {
    async fn exists(&self, user_id: UserId, url: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.keys.contains(&(user_id, url.to_string())))
    }

    async fn insert_batch(&self, records: &[ProcessedArticle]) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert_batch(records);
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ProcessedArticle>> {
        let store = self.store.read().await;
        Ok(store.list_by_user(user_id, limit, offset))
    }
}

#[async_trait]
impl ProfileStore for InMemoryStorage {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let store = self.store.read().await;
        Ok(store.profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, user_id: UserId, interests_description: &str) -> Result<Profile> {
        let mut store = self.store.write().await;
        let profile = match store.profiles.get(&user_id) {
            Some(existing) => Profile {
                interests_description: interests_description.to_string(),
                updated_at: Utc::now(),
                ..existing.clone()
            },
            None => Profile::new(user_id, interests_description),
        };
        store.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl ProcessingResultStore for InMemoryStorage {
    async fn store_result(&self, result: &ProcessingResult) -> Result<()> {
        let mut store = self.store.write().await;
        store.results.push(result.clone());
        Ok(())
    }

    async fn list_results(&self, user_id: UserId, limit: usize) -> Result<Vec<ProcessingResult>> {
        let store = self.store.read().await;
        Ok(store
            .results
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(page_size(limit))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::ClassificationOutcome;

    fn record(user_id: UserId, url: &str) -> ProcessedArticle {
        let outcome = ClassificationOutcome::success(url, "Title", true);
        ProcessedArticle::from_outcome(user_id, Some("http://blog"), &outcome)
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = InMemoryStorage::new();
        assert!(!storage.exists(1, "http://a/1").await.unwrap());

        storage
            .insert_batch(&[record(1, "http://a/1"), record(1, "http://a/2")])
            .await
            .unwrap();

        assert!(storage.exists(1, "http://a/1").await.unwrap());
        assert!(!storage.exists(2, "http://a/1").await.unwrap());

        let listed = storage.list_by_user(1, 50, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].url, "http://a/2");
    }

    #[tokio::test]
    async fn duplicate_keys_are_ignored() {
        let storage = InMemoryStorage::new();
        storage.insert_batch(&[record(1, "http://a/1")]).await.unwrap();
        storage
            .insert_batch(&[record(1, "http://a/1"), record(2, "http://a/1")])
            .await
            .unwrap();

        assert_eq!(storage.list_by_user(1, 50, 0).await.unwrap().len(), 1);
        assert_eq!(storage.list_by_user(2, 50, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_pages_through_rows() {
        let storage = InMemoryStorage::new();
        let records: Vec<_> = (0..5).map(|i| record(1, &format!("http://a/{}", i))).collect();
        storage.insert_batch(&records).await.unwrap();

        let page = storage.list_by_user(1, 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].url, "http://a/3");
        assert_eq!(page[1].url, "http://a/2");
        assert_eq!(storage.list_by_user(1, 0, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saving_a_profile_keeps_creation_time() {
        let storage = InMemoryStorage::new();
        let first = storage.save_profile(7, "rust").await.unwrap();
        let second = storage.save_profile(7, "rust and databases").await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        let stored = storage.get_profile(7).await.unwrap().unwrap();
        assert_eq!(stored.interests_description, "rust and databases");
        assert!(storage.get_profile(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn results_are_listed_newest_first() {
        let storage = InMemoryStorage::new();
        storage
            .store_result(&ProcessingResult::error(1, "http://a/1", "boom"))
            .await
            .unwrap();
        storage
            .store_result(&ProcessingResult::success(1, "http://a/2", vec!["t".into()]))
            .await
            .unwrap();

        let results = storage.list_results(1, 10).await.unwrap();
        assert_eq!(results[0].url, "http://a/2");
        assert_eq!(results[1].error_message.as_deref(), Some("boom"));
    }
}
