//! Prompt templates for the summary and script calls.

pub const SYSTEM_PROMPT: &str = "you are a helpful news assistant.";

const STYLE: &str = r#"
    STYLE:

    Begin with a brief, welcoming introduction
    Present stories in a conversational but professional tone
    Use everyday language, avoid jargon
    Keep the focus on what matters most to general audiences
"#;

pub fn summary_prompt(article_text: &str) -> String {
    format!(
        r#"
    Provide a summary of the main points in the following article. Focus on the essential ideas and key takeaways.
    Ignore any irrelevant information such as cookie consent messages or disclaimers.

    ARTICLE:
    {article_text}
    "#
    )
}

pub fn script_prompt(digest: &str) -> String {
    format!(
        r#"
    Create a natural-sounding news podcast script that covers today's top stories.

    DO NOT INVENT ANY INFORMATION. Only use information given.
    {STYLE}
    STRUCTURE:

    Begin with a friendly greeting
    Present stories in the order they are given
    End with a brief, natural conclusion
    Don't include speaker tags, sound effects, or production notes

    ARTICLES:
    {digest}
    "#
    )
}

pub fn deep_dive_prompt(article: &str) -> String {
    format!(
        r#"
    Do a deep dive into this article. Explore the entities involved (people, countries, organizations).
    Also explore the real-world implications and how they will affect the world.

    DO NOT INVENT ANY INFORMATION. Only use information given.
    {STYLE}
    STRUCTURE:

    Begin with a friendly greeting
    End with a brief, natural conclusion
    Don't include speaker tags, sound effects, or production notes

    ARTICLE:
    {article}
    "#
    )
}
