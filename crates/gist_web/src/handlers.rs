use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use gist_core::{FeedArticle, SpeechTask};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use crate::error::ApiError;
use crate::AppState;

const DEFAULT_FETCH_COUNT: usize = 5;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub article_title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleKeys {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Script {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    pub article_data: Map<String, Value>,
    pub script: String,
    pub speech_url: String,
}

#[derive(Debug, Serialize)]
pub struct DeepDiveResponse {
    pub deep_dive_script: String,
    pub speech_url: String,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub article_keys: Vec<String>,
    pub article_data: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct VoiceoverResponse {
    pub speech_data: SpeechTask,
}

/// Feed articles keyed by title, in feed order.
fn article_data(articles: &[FeedArticle]) -> Result<Map<String, Value>, gist_core::Error> {
    let mut data = Map::new();
    for article in articles {
        data.insert(article.title.clone(), serde_json::to_value(article)?);
    }
    Ok(data)
}

pub async fn full_pipeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
) -> ApiResult<PipelineResponse> {
    let context = "Pipeline processing failed";
    let digest = state.pipeline.digest(query.count).await.map_err(ApiError::context(context))?;

    Ok(Json(PipelineResponse {
        article_data: article_data(&digest.articles).map_err(ApiError::context(context))?,
        script: digest.script,
        speech_url: digest.speech_url,
    }))
}

pub async fn deep_dive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> ApiResult<DeepDiveResponse> {
    let deep_dive = state
        .pipeline
        .deep_dive(&query.article_title)
        .await
        .map_err(ApiError::context("Deep dive generation failed"))?;

    Ok(Json(DeepDiveResponse {
        deep_dive_script: deep_dive.script,
        speech_url: deep_dive.speech_url,
    }))
}

/// An empty body means the default count; anything else must be a valid
/// `FetchRequest` or the request is rejected.
pub async fn fetch_and_store(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<FetchResponse>, Response> {
    let context = "Failed to fetch articles";
    let count = if body.iter().all(u8::is_ascii_whitespace) {
        DEFAULT_FETCH_COUNT
    } else {
        let Json(request) = Json::<FetchRequest>::from_bytes(&body).map_err(IntoResponse::into_response)?;
        request.count.unwrap_or(DEFAULT_FETCH_COUNT)
    };

    let fail = |e| ApiError::new(context, e).into_response();
    let articles = state.pipeline.fetch_and_store(count).await.map_err(fail)?;

    Ok(Json(FetchResponse {
        article_keys: articles.iter().map(|a| a.title.clone()).collect(),
        article_data: article_data(&articles).map_err(fail)?,
    }))
}

pub async fn generate_script(
    State(state): State<Arc<AppState>>,
    Json(keys): Json<ArticleKeys>,
) -> ApiResult<Script> {
    let content = state
        .pipeline
        .generate_script(&keys.keys)
        .await
        .map_err(ApiError::context("Failed to generate script"))?;
    Ok(Json(Script { content }))
}

pub async fn generate_deep_dive_script(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> ApiResult<Script> {
    let content = state
        .pipeline
        .generate_deep_dive(&query.article_title)
        .await
        .map_err(ApiError::context("Failed to generate deep dive"))?;
    Ok(Json(Script { content }))
}

pub async fn generate_voiceover(
    State(state): State<Arc<AppState>>,
    Json(script): Json<Script>,
) -> ApiResult<VoiceoverResponse> {
    let speech_data = state
        .pipeline
        .generate_voiceover(&script.content)
        .await
        .map_err(ApiError::context("Failed to generate voiceover"))?;
    Ok(Json(VoiceoverResponse { speech_data }))
}
