use gist_core::{
    Article, ArticleStorage, ContentFetcher, Error, FeedArticle, InferenceModel, InsertOutcome, KeyedLocks, NewsFeed,
    Result, SpeechSynthesizer, SpeechTask,
};
use gist_storage::{ArtifactCache, Storage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::format::{format_deep_dive, format_digest};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Articles kept in the store; the oldest-inserted go first
    pub max_articles: usize,
    /// Upper bound for every call to an external service
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_articles: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Digest {
    /// Feed candidates in feed order, whether processed now or earlier
    pub articles: Vec<FeedArticle>,
    pub script: String,
    pub speech_url: String,
}

#[derive(Debug, Clone)]
pub struct DeepDive {
    pub script: String,
    pub speech_url: String,
}

pub fn digest_signature(count: usize) -> String {
    format!("/news/full-pipeline?count={}", count)
}

pub fn deep_dive_signature(title: &str) -> String {
    format!("/news/deep-dive?article_title={}", title)
}

pub struct Pipeline {
    articles: Arc<dyn ArticleStorage>,
    cache: ArtifactCache,
    feed: Arc<dyn NewsFeed>,
    fetcher: Arc<dyn ContentFetcher>,
    model: Arc<dyn InferenceModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
    title_locks: KeyedLocks,
}

impl Pipeline {
    pub fn new(
        storage: Storage,
        feed: Arc<dyn NewsFeed>,
        fetcher: Arc<dyn ContentFetcher>,
        model: Arc<dyn InferenceModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            articles: storage.articles,
            cache: ArtifactCache::new(storage.recordings),
            feed,
            fetcher,
            model,
            synthesizer,
            config,
            title_locks: KeyedLocks::new(),
        }
    }

    pub fn with_cache(mut self, cache: ArtifactCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn bounded<T>(&self, operation: &'static str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⏱️ {} timed out after {:?}", operation, self.config.timeout);
                Err(Error::Timeout {
                    operation,
                    seconds: self.config.timeout.as_secs(),
                })
            }
        }
    }

    /// Fetch the top `count` headlines, process and store the ones not seen
    /// before, and return all of them in feed order.
    pub async fn fetch_and_store(&self, count: usize) -> Result<Vec<FeedArticle>> {
        let candidates = self.bounded("news feed", self.feed.top_articles(count)).await?;
        let unprocessed = self.articles.filter_unprocessed(&candidates).await?;
        info!(
            "📰 {} returned {} articles, {} new",
            self.feed.name(),
            candidates.len(),
            unprocessed.len()
        );

        let mut inserted = 0;
        for candidate in unprocessed {
            if self.process_article(candidate).await? == InsertOutcome::Inserted {
                inserted += 1;
            }
        }

        if inserted > 0 {
            let evicted = self.articles.enforce_retention(self.config.max_articles).await?;
            if evicted > 0 {
                info!("🧹 Evicted {} oldest articles", evicted);
            }
        }

        Ok(candidates)
    }

    async fn process_article(&self, candidate: FeedArticle) -> Result<InsertOutcome> {
        let _guard = self.title_locks.lock(&candidate.title).await;
        if self.articles.exists(&candidate.title).await? {
            debug!("'{}' was stored by a concurrent request", candidate.title);
            return Ok(InsertOutcome::Duplicate);
        }

        let extracted = match tokio::time::timeout(self.config.timeout, self.fetcher.extract(&candidate.url)).await {
            Ok(text) => text,
            Err(_) => {
                warn!("⏱️ Extraction of {} timed out, storing without text", candidate.url);
                String::new()
            }
        };

        let summary = if extracted.is_empty() {
            debug!("No text for '{}', skipping summary", candidate.title);
            String::new()
        } else {
            info!("🤖 Summarizing '{}'", candidate.title);
            self.bounded("summarize", self.model.summarize(&extracted)).await?
        };

        let article = Article::processed(candidate, extracted, summary)?;
        let outcome = self.articles.insert_processed(&article).await?;
        info!("💾 Stored '{}'", article.title);
        Ok(outcome)
    }

    /// Podcast script for the stored articles named by `titles`, in that order.
    pub async fn generate_script(&self, titles: &[String]) -> Result<String> {
        let articles = self.articles.get_by_titles(titles).await?;
        if articles.is_empty() {
            return Err(Error::NotFound("No articles found for provided keys".to_string()));
        }

        let digest = format_digest(&articles);
        self.bounded("script generation", self.model.create_script(&digest)).await
    }

    pub async fn generate_deep_dive(&self, title: &str) -> Result<String> {
        let article = self
            .articles
            .get(title)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No article found for the given title: {}", title)))?;

        let formatted = format_deep_dive(&article);
        self.bounded("deep dive generation", self.model.create_deep_dive(&formatted)).await
    }

    /// Uncached synthesis; returns the provider's task descriptor as-is.
    pub async fn generate_voiceover(&self, script: &str) -> Result<SpeechTask> {
        self.bounded("speech synthesis", self.synthesizer.synthesize(script)).await
    }

    async fn cached_voiceover(&self, signature: &str, script: &str) -> Result<String> {
        self.cache
            .lookup_or_synthesize(signature, || async {
                let task = self.generate_voiceover(script).await?;
                task.output_uri()
                    .map(str::to_string)
                    .ok_or_else(|| Error::Speech("synthesis task has no output URI".to_string()))
            })
            .await
    }

    pub async fn digest(&self, count: usize) -> Result<Digest> {
        let articles = self.fetch_and_store(count).await?;
        let titles: Vec<String> = articles.iter().map(|a| a.title.clone()).collect();

        let script = self.generate_script(&titles).await?;
        info!("📝 Script ready for {} articles", titles.len());

        let speech_url = self.cached_voiceover(&digest_signature(count), &script).await?;
        Ok(Digest {
            articles,
            script,
            speech_url,
        })
    }

    pub async fn deep_dive(&self, title: &str) -> Result<DeepDive> {
        let script = self.generate_deep_dive(title).await?;
        let speech_url = self.cached_voiceover(&deep_dive_signature(title), &script).await?;
        Ok(DeepDive { script, speech_url })
    }
}
