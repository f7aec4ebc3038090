use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

/// A headline as delivered by the news feed, before extraction or summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedArticle {
    #[serde(default)]
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub content: Option<String>,
}

/// A processed article as persisted by the article store.
///
/// `extracted_content` is empty when extraction failed, in which case `summary`
/// is empty too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub content: Option<String>,
    pub extracted_content: String,
    pub summary: String,
}

impl Article {
    /// Builds a stored article from a feed candidate and its processing outputs.
    pub fn processed(candidate: FeedArticle, extracted_content: String, summary: String) -> Result<Self> {
        if candidate.title.trim().is_empty() {
            return Err(Error::InvalidArticle("title must not be empty".to_string()));
        }
        if extracted_content.is_empty() && !summary.is_empty() {
            return Err(Error::InvalidArticle(format!(
                "'{}' has a summary but no extracted content",
                candidate.title
            )));
        }

        Ok(Self {
            title: candidate.title,
            author: candidate.author,
            published_at: candidate.published_at,
            url: candidate.url,
            url_to_image: candidate.url_to_image,
            content: candidate.content,
            extracted_content,
            summary,
        })
    }

    pub fn published_at_rfc3339(&self) -> String {
        self.published_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An article with the same title was already stored; nothing was written.
    Duplicate,
}

/// One cached voiceover per request signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub signature: String,
    pub reference: String,
    /// Seconds since the epoch.
    pub generated_at: i64,
}

impl RecordingEntry {
    /// A timestamp ahead of `now` counts as fresh.
    pub fn is_fresh(&self, now: i64, ttl_secs: i64) -> bool {
        now - self.generated_at < ttl_secs
    }
}

/// Task descriptor returned by a speech synthesizer, kept as the provider sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeechTask(pub Value);

impl SpeechTask {
    pub fn output_uri(&self) -> Option<&str> {
        self.0.pointer("/SynthesisTask/OutputUri").and_then(Value::as_str)
    }
}
