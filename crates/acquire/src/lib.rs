//! Content acquisition: a news link or raw text in, a [`ContentRecord`] out.
//!
//! One call to [`acquire`] issues exactly one request to a [`Summarizer`]
//! (in production, [`GeminiSummarizer`]) and validates the JSON it sends
//! back. Nothing is cached and nothing is retried; whether a second call may
//! start while one is pending is the caller's business.

pub mod error;
mod gemini;
mod prompt;
mod reply;

pub use crate::gemini::GeminiSummarizer;
pub use crate::prompt::{CompletionRequest, Source, response_schema};
pub use crate::reply::parse_reply;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use instanews_content::ContentRecord;
use std::sync::Arc;
use tracing::instrument;

pub type SummarizerHandle = Arc<dyn Summarizer>;

/// A hosted text-in/JSON-out completion service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Name used in logs (usually the model).
    fn name(&self) -> &str;

    /// Sends one completion request and returns the raw reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Asks `summarizer` to summarise `input` and validates the reply.
///
/// Every failure, whether network, service, or an unparseable reply, surfaces
/// as [`ErrorKind::Extraction`] with the actual cause underneath it.
#[instrument(skip(summarizer, input), fields(summarizer = summarizer.name(), input_size = input.len()))]
pub async fn acquire(summarizer: &dyn Summarizer, input: &str, is_url: bool) -> Result<ContentRecord> {
    let source = Source::new(input, is_url);
    let request = CompletionRequest::from(&source);
    let reply = summarizer.complete(&request).await.or_raise(|| ErrorKind::Extraction)?;
    let record = parse_reply(&reply).or_raise(|| ErrorKind::Extraction)?;
    tracing::info!(title = %record.title, "Content acquired");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use instanews_content::DEFAULT_IMAGE_URL;
    use std::sync::Mutex;

    /// Replies with a canned text and remembers what it was asked.
    struct Canned {
        reply: std::result::Result<String, ErrorKind>,
        seen: Mutex<Vec<CompletionRequest>>,
    }
    impl Canned {
        fn ok(reply: &str) -> Self {
            Self { reply: Ok(reply.to_string()), seen: Mutex::new(Vec::new()) }
        }
        fn failing(kind: ErrorKind) -> Self {
            Self { reply: Err(kind), seen: Mutex::new(Vec::new()) }
        }
    }
    #[async_trait]
    impl Summarizer for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(kind) => exn::bail!(kind.clone()),
            }
        }
    }

    #[tokio::test]
    async fn breaking_news_from_url() {
        let summarizer = Canned::ok(
            r#"{"title": "Breaking", "subtitle": "", "summary": "Short summary.", "imageUrl": "placeholder.png"}"#,
        );
        let record = acquire(&summarizer, "https://example.com/news", true).await.unwrap();
        assert_eq!(record.title, "Breaking");
        assert_eq!(record.summary, "Short summary.");
        assert_eq!(record.image_url, DEFAULT_IMAGE_URL);

        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].search);
        assert!(seen[0].prompt.contains("https://example.com/news"));
    }

    #[tokio::test]
    async fn invalid_json_is_extraction_error() {
        let summarizer = Canned::ok("Sorry, I can't help with that.");
        let err = acquire(&summarizer, "texto", false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Extraction);
        assert_eq!((*err).to_string(), "could not automatically process the text");
    }

    #[tokio::test]
    async fn service_failure_is_extraction_error() {
        let summarizer = Canned::failing(ErrorKind::Network);
        let err = acquire(&summarizer, "texto", false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Extraction);
        assert_eq!(summarizer.seen.lock().unwrap().len(), 1);
    }
}
