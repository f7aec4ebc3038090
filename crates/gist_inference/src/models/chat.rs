use async_trait::async_trait;
use gist_core::{Error, InferenceModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::prompts::{deep_dive_prompt, script_prompt, summary_prompt, SYSTEM_PROMPT};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SUMMARY_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_SCRIPT_MODEL: &str = "llama3-70b-8192";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Client for any OpenAI-compatible chat-completions endpoint (Groq by default).
pub struct ChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    summary_model: String,
    script_model: String,
}

impl ChatModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| Error::Config("Chat model API key is required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config
                .model_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            summary_model: config.summary_model.unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string()),
            script_model: config.script_model.unwrap_or_else(|| DEFAULT_SCRIPT_MODEL.to_string()),
        })
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
        };

        debug!("Requesting completion from {} ({} prompt bytes)", model, prompt.len());
        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference(format!("{} returned no choices", model)))
    }
}

impl fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("summary_model", &self.summary_model)
            .field("script_model", &self.script_model)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for ChatModel {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        self.complete(&self.summary_model, &summary_prompt(text)).await
    }

    async fn create_script(&self, digest: &str) -> Result<String> {
        self.complete(&self.script_model, &script_prompt(digest)).await
    }

    async fn create_deep_dive(&self, article: &str) -> Result<String> {
        self.complete(&self.script_model, &deep_dive_prompt(article)).await
    }
}
