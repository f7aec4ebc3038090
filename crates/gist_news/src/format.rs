use gist_core::Article;

const SEPARATOR: &str = "--------------------------------------------------";

fn author(article: &Article) -> &str {
    article.author.as_deref().unwrap_or_default()
}

/// Multi-article digest handed to the script writer, in the order given.
pub fn format_digest(articles: &[Article]) -> String {
    let mut formatted = String::new();
    for (i, article) in articles.iter().enumerate() {
        formatted.push_str(&format!(
            "{}\nArticle {}\nTitle: {}\nAuthor: {}\nPublished at: {}\nIntroduction: {}\nSummary: {}\n",
            SEPARATOR,
            i + 1,
            article.title,
            author(article),
            article.published_at_rfc3339(),
            article.content.as_deref().unwrap_or_default(),
            article.summary,
        ));
    }
    formatted
}

pub fn format_deep_dive(article: &Article) -> String {
    format!(
        "Title: {}\nAuthor: {}\nPublished at: {}\nIntroduction: {}\n\nContent: {}\n",
        article.title,
        author(article),
        article.published_at_rfc3339(),
        article.content.as_deref().unwrap_or_default(),
        article.extracted_content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, summary: &str) -> Article {
        Article {
            title: title.to_string(),
            author: Some(format!("{} Author", title)),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            url: format!("https://example.com/{}", title),
            url_to_image: None,
            content: Some(format!("{} intro", title)),
            extracted_content: format!("{} full text", title),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn test_digest_keeps_order_and_fields() {
        let digest = format_digest(&[article("Title1", "First summary"), article("Title2", "Second summary")]);

        let first = digest.find("Title: Title1").unwrap();
        let second = digest.find("Title: Title2").unwrap();
        assert!(first < second);
        assert!(digest.find("Summary: First summary").unwrap() < second);
        assert!(digest.contains("Article 2\nTitle: Title2\nAuthor: Title2 Author\nPublished at: 2024-05-01T12:00:00Z\nIntroduction: Title2 intro\nSummary: Second summary\n"));
        assert_eq!(digest.matches(SEPARATOR).count(), 2);
        assert!(!digest.contains("full text"));
    }

    #[test]
    fn test_digest_of_nothing_is_empty() {
        assert_eq!(format_digest(&[]), "");
    }

    #[test]
    fn test_deep_dive_includes_full_text_and_blank_author() {
        let mut a = article("Title1", "");
        a.author = None;
        let formatted = format_deep_dive(&a);
        assert_eq!(
            formatted,
            "Title: Title1\nAuthor: \nPublished at: 2024-05-01T12:00:00Z\nIntroduction: Title1 intro\n\nContent: Title1 full text\n"
        );
    }
}
