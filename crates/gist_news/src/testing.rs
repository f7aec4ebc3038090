//! In-process stand-ins for the external services, with call counters.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gist_core::{
    ArticleSource, ContentFetcher, Error, FeedArticle, InferenceModel, NewsFeed, Result, SpeechSynthesizer,
    SpeechTask,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn feed_article(title: &str) -> FeedArticle {
    FeedArticle {
        source: ArticleSource { id: None, name: "Test Wire".to_string() },
        author: Some(format!("{} Author", title)),
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        url: format!("https://example.com/{}", title.replace(' ', "-")),
        url_to_image: None,
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_default(),
        content: Some(format!("{} intro", title)),
    }
}

#[derive(Default)]
pub struct StaticFeed {
    articles: Vec<FeedArticle>,
    fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl StaticFeed {
    pub fn new(titles: &[&str]) -> Self {
        Self {
            articles: titles.iter().map(|t| feed_article(t)).collect(),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NewsFeed for StaticFeed {
    fn name(&self) -> &str {
        "Static"
    }

    async fn top_articles(&self, count: usize) -> Result<Vec<FeedArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Feed("feed unavailable".to_string()));
        }
        Ok(self.articles.iter().take(count).cloned().collect())
    }
}

/// Returns `"<url> text"` for every URL except those registered as empty.
#[derive(Default)]
pub struct StaticFetcher {
    empty: HashSet<String>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty(mut self, url: &str) -> Self {
        self.empty.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn extract(&self, url: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.empty.contains(url) {
            String::new()
        } else {
            format!("{} text", url)
        }
    }
}

/// Summaries are `"summary of <text>"`; scripts echo their input.
#[derive(Debug, Default)]
pub struct EchoModel {
    delay: Option<Duration>,
    pub summaries: AtomicUsize,
    pub scripts: AtomicUsize,
}

impl EchoModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl InferenceModel for EchoModel {
    fn name(&self) -> &str {
        "Echo"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("summary of {}", text))
    }

    async fn create_script(&self, digest: &str) -> Result<String> {
        self.scripts.fetch_add(1, Ordering::SeqCst);
        Ok(format!("SCRIPT\n{}", digest))
    }

    async fn create_deep_dive(&self, article: &str) -> Result<String> {
        self.scripts.fetch_add(1, Ordering::SeqCst);
        Ok(format!("DEEP DIVE\n{}", article))
    }
}

/// Hands out numbered output URIs, or descriptors without one when `missing_uri` is set.
#[derive(Debug, Default)]
pub struct CountingSynthesizer {
    missing_uri: AtomicBool,
    pub calls: AtomicUsize,
}

impl CountingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_missing_uri(&self, missing: bool) {
        self.missing_uri.store(missing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechSynthesizer for CountingSynthesizer {
    fn name(&self) -> &str {
        "Counting"
    }

    async fn synthesize(&self, _script: &str) -> Result<SpeechTask> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.missing_uri.load(Ordering::SeqCst) {
            return Ok(SpeechTask(json!({"SynthesisTask": {"TaskStatus": "failed"}})));
        }
        Ok(SpeechTask(json!({
            "SynthesisTask": {"OutputUri": format!("https://cdn.example.com/{}.mp3", n)}
        })))
    }
}
