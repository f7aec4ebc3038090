use async_trait::async_trait;
use gist_core::{Error, Result, SpeechSynthesizer, SpeechTask};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::SpeechConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.v7.unrealspeech.com";
pub const DEFAULT_VOICE: &str = "Will";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    bitrate: &'a str,
    speed: &'a str,
    pitch: &'a str,
    timestamp_type: &'a str,
}

/// Unreal Speech `synthesisTasks` client. The task descriptor is returned as
/// sent; the audio lands at `SynthesisTask.OutputUri` once the task completes.
pub struct UnrealSpeech {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
}

impl UnrealSpeech {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| Error::Config("Unreal Speech API key is required".to_string()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            voice_id: config.voice_id.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        })
    }
}

impl fmt::Debug for UnrealSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnrealSpeech")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .finish()
    }
}

#[async_trait]
impl SpeechSynthesizer for UnrealSpeech {
    fn name(&self) -> &str {
        "UnrealSpeech"
    }

    async fn synthesize(&self, script: &str) -> Result<SpeechTask> {
        let request = SynthesisRequest {
            text: script,
            voice_id: &self.voice_id,
            bitrate: "192k",
            speed: "0.25",
            pitch: "0.92",
            timestamp_type: "sentence",
        };

        debug!("Submitting {} characters for synthesis", script.chars().count());
        let response = self.client
            .post(format!("{}/synthesisTasks", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("synthesis request failed with {}: {}", status, body)));
        }

        Ok(SpeechTask(response.json::<Value>().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn synthesizer_for(base_url: String) -> UnrealSpeech {
        UnrealSpeech::new(SpeechConfig {
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url),
            voice_id: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_synthesis_returns_descriptor() {
        let app = Router::new().route(
            "/synthesisTasks",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "SynthesisTask": {
                        "OutputUri": format!("https://cdn.example.com/{}.mp3", body["VoiceId"].as_str().unwrap_or("?")),
                        "RequestCharacters": body["Text"].as_str().map(str::len),
                        "Bitrate": body["Bitrate"],
                    }
                }))
            }),
        );
        let synthesizer = synthesizer_for(serve(app).await);

        let task = synthesizer.synthesize("Good morning").await.unwrap();
        assert_eq!(task.output_uri(), Some("https://cdn.example.com/Will.mp3"));
        assert_eq!(task.0["SynthesisTask"]["RequestCharacters"], 12);
        assert_eq!(task.0["SynthesisTask"]["Bitrate"], "192k");
    }

    #[tokio::test]
    async fn test_rejected_request_is_speech_error() {
        let app = Router::new().route(
            "/synthesisTasks",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let synthesizer = synthesizer_for(serve(app).await);

        let err = synthesizer.synthesize("Good morning").await.unwrap_err();
        assert!(matches!(err, Error::Speech(ref msg) if msg.contains("bad key")));
    }
}
