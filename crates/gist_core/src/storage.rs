use async_trait::async_trait;
use crate::types::{Article, FeedArticle, InsertOutcome, RecordingEntry};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// True iff an article with exactly this title is stored
    async fn exists(&self, title: &str) -> Result<bool>;

    /// Candidates whose titles are not stored yet, in input order
    async fn filter_unprocessed(&self, candidates: &[FeedArticle]) -> Result<Vec<FeedArticle>> {
        let mut unprocessed = Vec::new();
        for candidate in candidates {
            if !self.exists(&candidate.title).await? {
                unprocessed.push(candidate.clone());
            }
        }
        Ok(unprocessed)
    }

    /// Store a processed article. A title that is already stored is left untouched.
    async fn insert_processed(&self, article: &Article) -> Result<InsertOutcome>;

    /// Evict the oldest-inserted articles beyond `max_count`, returning how many went
    async fn enforce_retention(&self, max_count: usize) -> Result<usize>;

    async fn get(&self, title: &str) -> Result<Option<Article>>;

    /// Stored articles for `titles`, in the order given; unknown titles are skipped
    async fn get_by_titles(&self, titles: &[String]) -> Result<Vec<Article>> {
        let mut articles = Vec::with_capacity(titles.len());
        for title in titles {
            if let Some(article) = self.get(title).await? {
                articles.push(article);
            }
        }
        Ok(articles)
    }

    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait RecordingStorage: Send + Sync {
    async fn get_recording(&self, signature: &str) -> Result<Option<RecordingEntry>>;

    /// Insert or overwrite the entry for `entry.signature`
    async fn upsert_recording(&self, entry: &RecordingEntry) -> Result<()>;
}
