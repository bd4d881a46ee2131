//! Validation and normalisation of the service's JSON reply.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use instanews_content::{ContentRecord, resolve_image_url};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    title: String,
    subtitle: String,
    summary: String,
    #[serde(default)]
    image_url: Option<String>,
}

/// Parses the reply text into a [`ContentRecord`].
///
/// The record carries no logo; the caller decides which logo a fresh record
/// gets. A missing, blank, or placeholder `imageUrl` becomes the default stock
/// photo.
#[instrument(skip_all, fields(reply_size = text.len()))]
pub fn parse_reply(text: &str) -> Result<ContentRecord> {
    let reply: Reply = serde_json::from_str(strip_code_fence(text))
        .or_raise(|| ErrorKind::MalformedReply("expected a JSON object with title, subtitle and summary".into()))?;
    if reply.title.trim().is_empty() {
        exn::bail!(ErrorKind::MalformedReply("empty title".into()));
    }
    if reply.summary.trim().is_empty() {
        exn::bail!(ErrorKind::MalformedReply("empty summary".into()));
    }
    Ok(ContentRecord {
        title: reply.title.trim().to_string(),
        subtitle: reply.subtitle.trim().to_string(),
        summary: reply.summary.trim().to_string(),
        image_url: resolve_image_url(reply.image_url.as_deref()),
        logo_url: None,
    })
}

/// Models occasionally wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(fenced) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
