//! Instructions sent to the summarization service.

use serde_json::{Value, json};

/// What the editor handed over: a link to an article, or the article text itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Text(String),
}
impl Source {
    pub fn new(input: impl Into<String>, is_url: bool) -> Self {
        match is_url {
            true => Self::Url(input.into()),
            false => Self::Text(input.into()),
        }
    }

    /// Classifies raw input the way the editor's paste box always has:
    /// anything starting with `http` is a link.
    pub fn detect(input: impl Into<String>) -> Self {
        let input = input.into();
        let is_url = input.trim_start().starts_with("http");
        Self::new(input, is_url)
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// The natural-language instruction for this source.
    pub fn prompt(&self) -> String {
        match self {
            Self::Url(url) => format!(
                "Extract and summarize the news article from this URL: {}.\n\
                 Format the response as a JSON object with: title (very short and punchy), subtitle, \
                 summary (max 250 chars), and a placeholder imageUrl.",
                url.trim()
            ),
            Self::Text(text) => format!(
                "Summarize the following text into a journalistic news post for Instagram.\n\
                 Text: {}.\n\
                 Format the response as a JSON object with: title (catchy), subtitle, \
                 summary (max 250 chars), and a placeholder imageUrl.",
                text.trim()
            ),
        }
    }
}

/// Everything a [`Summarizer`](crate::Summarizer) needs for one call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// JSON schema the reply must follow.
    pub schema: Value,
    /// Let the service look the link up itself (search grounding).
    pub search: bool,
}
impl From<&Source> for CompletionRequest {
    fn from(source: &Source) -> Self {
        Self { prompt: source.prompt(), schema: response_schema(), search: source.is_url() }
    }
}

/// Output schema directive: an object of strings, `imageUrl` optional.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "subtitle": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "imageUrl": { "type": "STRING" },
        },
        "required": ["title", "subtitle", "summary"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/news/1", true)]
    #[case("  http://example.com", true)]
    #[case("Prefeitura anuncia obras na ponte", false)]
    #[case("Leia em https://example.com", false)]
    fn test_detect(#[case] input: &str, #[case] is_url: bool) {
        assert_eq!(Source::detect(input).is_url(), is_url);
    }

    #[test]
    fn url_prompt_asks_to_fetch() {
        let prompt = Source::new("https://example.com/a", true).prompt();
        assert!(prompt.starts_with("Extract and summarize the news article from this URL: https://example.com/a."));
        assert!(prompt.contains("title (very short and punchy)"));
    }

    #[test]
    fn text_prompt_embeds_text() {
        let prompt = Source::new("  A ponte foi reaberta.  ", false).prompt();
        assert!(prompt.contains("journalistic news post"));
        assert!(prompt.contains("Text: A ponte foi reaberta.."));
        assert!(prompt.contains("title (catchy)"));
    }

    #[test]
    fn only_links_enable_search() {
        assert!(CompletionRequest::from(&Source::Url("https://x".into())).search);
        assert!(!CompletionRequest::from(&Source::Text("x".into())).search);
    }

    #[test]
    fn schema_requires_three_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["title", "subtitle", "summary"]));
        assert_eq!(schema["properties"]["imageUrl"]["type"], "STRING");
    }
}
