use std::fmt;
use async_trait::async_trait;
use crate::types::SpeechTask;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Summarize the full text of a single article
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Turn a formatted multi-article digest into a podcast script
    async fn create_script(&self, digest: &str) -> Result<String>;

    /// Turn a single formatted article into a deep-dive script
    async fn create_deep_dive(&self, article: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Submit a script for synthesis and return the provider's task descriptor
    async fn synthesize(&self, script: &str) -> Result<SpeechTask>;
}
