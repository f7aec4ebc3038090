use async_trait::async_trait;
use gist_core::{Result, SpeechSynthesizer, SpeechTask};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out `memory://` output URIs without synthesizing anything.
#[derive(Debug, Default)]
pub struct DummySynthesizer {
    tasks: AtomicUsize,
}

impl DummySynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpeechSynthesizer for DummySynthesizer {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn synthesize(&self, script: &str) -> Result<SpeechTask> {
        let task = self.tasks.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SpeechTask(json!({
            "SynthesisTask": {
                "TaskId": format!("dummy-{}", task),
                "TaskStatus": "completed",
                "OutputUri": format!("memory://voiceover/{}.mp3", task),
                "RequestCharacters": script.chars().count(),
            }
        })))
    }
}
