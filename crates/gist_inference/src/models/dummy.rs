use async_trait::async_trait;
use gist_core::{InferenceModel, Result};

/// Offline stand-in that never leaves the process: summaries are the first
/// twenty words and scripts wrap the formatted text.
#[derive(Debug, Default)]
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().take(20).collect();
        Ok(words.join(" "))
    }

    async fn create_script(&self, digest: &str) -> Result<String> {
        Ok(format!("Welcome to today's gist.\n{}\nThat's all for now.", digest.trim()))
    }

    async fn create_deep_dive(&self, article: &str) -> Result<String> {
        Ok(format!("Welcome to the deep dive.\n{}\nThanks for listening.", article.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let text = (1..=30).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let summary = model.summarize(&text).await.unwrap();
        assert_eq!(summary.split_whitespace().count(), 20);
        assert!(summary.starts_with("w1 w2"));

        let script = model.create_script("  Article 1\nTitle: Title1  ").await.unwrap();
        assert!(script.contains("Article 1\nTitle: Title1"));

        let deep_dive = model.create_deep_dive("Title: Title1").await.unwrap();
        assert!(deep_dive.contains("Title: Title1"));
    }
}
