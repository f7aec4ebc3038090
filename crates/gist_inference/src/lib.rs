use gist_core::{InferenceModel, Result, SpeechSynthesizer};
use std::sync::Arc;

pub mod models;
pub mod prompts;
pub mod speech;

/// Settings for the OpenAI-compatible chat backend
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API; Groq when unset
    pub model_url: Option<String>,
    pub summary_model: Option<String>,
    pub script_model: Option<String>,
}

/// Settings for the speech synthesis backend
#[derive(Debug, Clone, Default)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModelKind {
    #[default]
    Groq,
    Dummy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SpeechKind {
    #[default]
    Unreal,
    Dummy,
}

pub fn create_model(kind: ModelKind, config: Config) -> Result<Arc<dyn InferenceModel>> {
    match kind {
        ModelKind::Groq => Ok(Arc::new(models::chat::ChatModel::new(config)?)),
        ModelKind::Dummy => Ok(Arc::new(models::dummy::DummyModel::new())),
    }
}

pub fn create_synthesizer(kind: SpeechKind, config: SpeechConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    match kind {
        SpeechKind::Unreal => Ok(Arc::new(speech::unreal::UnrealSpeech::new(config)?)),
        SpeechKind::Dummy => Ok(Arc::new(speech::dummy::DummySynthesizer::new())),
    }
}

pub mod prelude {
    pub use super::{create_model, create_synthesizer, Config, ModelKind, SpeechConfig, SpeechKind};
    pub use gist_core::{Error, InferenceModel, Result, SpeechSynthesizer};
}
