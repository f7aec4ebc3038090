use async_trait::async_trait;
use gist_core::{Article, ArticleStorage, InsertOutcome, RecordingEntry, RecordingStorage, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

/// Articles are kept in insertion order, so the front of `articles` is always the oldest.
#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    recordings: HashMap<String, RecordingEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, title: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.title == title)
    }

    pub fn insert(&mut self, article: &Article) -> InsertOutcome {
        if self.find(&article.title).is_some() {
            return InsertOutcome::Duplicate;
        }
        self.articles.push(article.clone());
        InsertOutcome::Inserted
    }

    pub fn evict_oldest(&mut self, max_count: usize) -> usize {
        let excess = self.articles.len().saturating_sub(max_count);
        self.articles.drain(..excess);
        excess
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(_path: &Path) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn exists(&self, title: &str) -> Result<bool> {
        Ok(self.store.read().await.find(title).is_some())
    }

    async fn insert_processed(&self, article: &Article) -> Result<InsertOutcome> {
        Ok(self.store.write().await.insert(article))
    }

    async fn enforce_retention(&self, max_count: usize) -> Result<usize> {
        Ok(self.store.write().await.evict_oldest(max_count))
    }

    async fn get(&self, title: &str) -> Result<Option<Article>> {
        Ok(self.store.read().await.find(title).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.articles.len())
    }
}

#[async_trait]
impl RecordingStorage for MemoryStorage {
    async fn get_recording(&self, signature: &str) -> Result<Option<RecordingEntry>> {
        Ok(self.store.read().await.recordings.get(signature).cloned())
    }

    async fn upsert_recording(&self, entry: &RecordingEntry) -> Result<()> {
        self.store
            .write()
            .await
            .recordings
            .insert(entry.signature.clone(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gist_core::{ArticleSource, FeedArticle};

    fn candidate(title: &str) -> FeedArticle {
        FeedArticle {
            source: ArticleSource::default(),
            author: None,
            title: title.to_string(),
            description: None,
            url: format!("https://example.com/{}", title),
            url_to_image: None,
            published_at: Utc::now(),
            content: None,
        }
    }

    fn article(title: &str) -> Article {
        Article::processed(candidate(title), "Text".to_string(), "Summary".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_filter_unprocessed_returns_absent_titles() {
        let storage = MemoryStorage::new();
        storage.insert_processed(&article("Title2")).await.unwrap();

        let candidates = vec![candidate("Title1"), candidate("Title2"), candidate("Title3")];
        let first = storage.filter_unprocessed(&candidates).await.unwrap();
        let titles: Vec<_> = first.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Title1", "Title3"]);

        // Filtering does not touch the store, so a second call agrees.
        let second = storage.filter_unprocessed(&candidates).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retention_keeps_newest() {
        let storage = MemoryStorage::new();
        let max_count = 5;
        for i in 0..max_count {
            storage.insert_processed(&article(&format!("Title{}", i))).await.unwrap();
        }
        assert_eq!(storage.enforce_retention(max_count).await.unwrap(), 0);

        storage.insert_processed(&article("Newest")).await.unwrap();
        assert_eq!(storage.enforce_retention(max_count).await.unwrap(), 1);

        assert_eq!(storage.count().await.unwrap(), max_count);
        assert!(!storage.exists("Title0").await.unwrap());
        assert!(storage.exists("Title1").await.unwrap());
        assert!(storage.exists("Newest").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_noop() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.insert_processed(&article("Title1")).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(storage.insert_processed(&article("Title1")).await.unwrap(), InsertOutcome::Duplicate);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recordings_are_keyed_by_signature() {
        let storage = MemoryStorage::new();
        let entry = RecordingEntry {
            signature: "/news/deep-dive?article_title=Title1".to_string(),
            reference: "memory://1".to_string(),
            generated_at: 1,
        };
        storage.upsert_recording(&entry).await.unwrap();
        assert_eq!(storage.get_recording(&entry.signature).await.unwrap(), Some(entry));
        assert!(storage.get_recording("/news/full-pipeline?count=1").await.unwrap().is_none());
    }
}
