use async_trait::async_trait;
use gist_core::{Error, FeedArticle, NewsFeed, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
/// NewsAPI refuses page sizes above this.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
struct TopHeadlines {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

/// Top English headlines from NewsAPI.
pub struct NewsApiFeed {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiFeed {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| Error::Config("NewsAPI key is required".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Drops untitled articles and repeated titles, keeping the first occurrence in place.
pub fn dedup_by_title(articles: Vec<FeedArticle>) -> Vec<FeedArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| !a.title.trim().is_empty())
        .filter(|a| seen.insert(a.title.clone()))
        .collect()
}

#[async_trait]
impl NewsFeed for NewsApiFeed {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn top_articles(&self, count: usize) -> Result<Vec<FeedArticle>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let page_size = count.min(MAX_PAGE_SIZE).to_string();
        let headlines = self.client
            .get(format!("{}/top-headlines", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(&[("language", "en"), ("pageSize", page_size.as_str())])
            .send()
            .await?
            .json::<TopHeadlines>()
            .await?;

        if headlines.status != "ok" {
            return Err(Error::Feed(format!(
                "NewsAPI returned status '{}': {}",
                headlines.status,
                headlines.message.unwrap_or_default()
            )));
        }

        let total = headlines.articles.len();
        let articles: Vec<FeedArticle> = headlines
            .articles
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(article) => Some(article),
                Err(e) => {
                    warn!("Skipping malformed headline: {}", e);
                    None
                }
            })
            .collect();

        let mut articles = dedup_by_title(articles);
        articles.truncate(count);
        debug!("NewsAPI returned {} headlines, keeping {}", total, articles.len());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::HeaderMap, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn headline(title: &str) -> Value {
        json!({
            "source": {"id": null, "name": "Wire"},
            "author": "Reporter",
            "title": title,
            "description": null,
            "url": format!("https://example.com/{}", title),
            "urlToImage": null,
            "publishedAt": "2024-05-01T12:00:00Z",
            "content": "Lead"
        })
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v2", addr)
    }

    #[test]
    fn test_dedup_keeps_first_position() {
        let articles: Vec<FeedArticle> = ["Title1", "Title2", "Title1", "", "Title3"]
            .iter()
            .map(|t| serde_json::from_value(headline(t)).unwrap())
            .collect();
        let titles: Vec<_> = dedup_by_title(articles).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Title1", "Title2", "Title3"]);
    }

    #[test]
    fn test_feed_requires_key() {
        assert!(matches!(NewsApiFeed::new(None, None), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_top_articles_in_feed_order() {
        let app = Router::new().route(
            "/v2/top-headlines",
            get(|headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(headers.get("X-Api-Key").unwrap(), "test-key");
                assert_eq!(params.get("language").map(String::as_str), Some("en"));
                Json(json!({
                    "status": "ok",
                    "totalResults": 4,
                    "articles": [
                        headline("Title1"),
                        {"title": "Broken", "publishedAt": "not a date"},
                        headline("Title2"),
                        headline("Title3"),
                    ]
                }))
            }),
        );
        let feed = NewsApiFeed::new(Some("test-key".to_string()), Some(serve(app).await)).unwrap();

        let articles = feed.top_articles(2).await.unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Title1", "Title2"]);
        assert!(feed.top_articles(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_feed_error() {
        let app = Router::new().route(
            "/v2/top-headlines",
            get(|| async { Json(json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"})) }),
        );
        let feed = NewsApiFeed::new(Some("bad".to_string()), Some(serve(app).await)).unwrap();

        let err = feed.top_articles(5).await.unwrap_err();
        assert!(matches!(err, Error::Feed(ref msg) if msg.contains("invalid")));
    }
}
