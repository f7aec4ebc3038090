use async_trait::async_trait;
use crate::types::FeedArticle;
use crate::Result;

#[async_trait]
pub trait NewsFeed: Send + Sync {
    fn name(&self) -> &str;

    /// The current top `count` headlines in feed order, unique by title
    async fn top_articles(&self, count: usize) -> Result<Vec<FeedArticle>>;
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Full text of the page at `url`, or an empty string when nothing could be extracted
    async fn extract(&self, url: &str) -> String;
}
