use async_trait::async_trait;
use gist_core::{ContentFetcher, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Pages fetched per article before giving up on finding any text.
pub const MAX_ATTEMPTS: usize = 5;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Extracts article text as the concatenation of every `<p>` on the page.
///
/// HTTP redirects are followed by the client. Pages with no paragraph text
/// are retried at their `<meta http-equiv="refresh">` target or final URL,
/// up to [`MAX_ATTEMPTS`] pages in total.
pub struct ParagraphFetcher {
    client: Client,
}

impl ParagraphFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &Url) -> Result<(Url, String)> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let final_url = response.url().clone();
        Ok((final_url, response.text().await?))
    }
}

/// Text of every non-empty `<p>` element, joined by single spaces.
pub fn paragraph_text(html: &str) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Target of a `<meta http-equiv="refresh" content="0; url=...">` tag, resolved against `base`.
pub fn meta_refresh_target(html: &str, base: &Url) -> Option<Url> {
    let selector = Selector::parse("meta[http-equiv]").ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|el| el.value().attr("content"))
        .find_map(|content| {
            let lower = content.to_ascii_lowercase();
            let start = lower.find("url=")? + "url=".len();
            let target = content[start..].trim().trim_matches(|c| c == '\'' || c == '"');
            base.join(target).ok()
        })
}

#[async_trait]
impl ContentFetcher for ParagraphFetcher {
    async fn extract(&self, url: &str) -> String {
        let mut current = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot extract from invalid URL {}: {}", url, e);
                return String::new();
            }
        };

        for attempt in 1..=MAX_ATTEMPTS {
            let (final_url, html) = match self.fetch(&current).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", current, e);
                    return String::new();
                }
            };

            let text = paragraph_text(&html);
            if !text.is_empty() {
                debug!("Extracted {} bytes from {} (attempt {})", text.len(), final_url, attempt);
                return text;
            }

            let next = meta_refresh_target(&html, &final_url).unwrap_or(final_url);
            if next == current {
                break;
            }
            debug!("No text at {}, following to {}", current, next);
            current = next;
        }

        warn!("No article text found for {}", url);
        String::new()
    }
}
