use serde::{Deserialize, Serialize};

/// Stock photo used whenever the summarization service does not provide a usable image.
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1495020689067-958852a7765e?auto=format&fit=crop&q=80&w=1080";
/// Station logo (ND 104.5 FM).
pub const DEFAULT_LOGO_URL: &str = "https://i.ibb.co/L6V6Y4K/logo-nd-104-5.png";
/// Marker the service is asked to put in its `imageUrl`; any URL containing it is not a real image.
pub const PLACEHOLDER_MARKER: &str = "placeholder";

const SEED_TITLE: &str = "Título Exemplo da Notícia Principal";
const SEED_SUMMARY: &str = "Cole um link ou texto para gerar o resumo automaticamente aqui.";

/// The single unit of work: everything a card needs to be drawn.
///
/// Records are never mutated in place once handed out; the `with_*` methods
/// return an edited copy instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub title: String,
    /// Carried through from the service reply, never drawn.
    #[serde(default)]
    pub subtitle: String,
    pub summary: String,
    /// Network URL or `data:` URI of the background photo.
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl ContentRecord {
    /// The record a fresh session starts with, so that the edit step always
    /// has a non-empty title and summary to show.
    pub fn seed(logo_url: impl Into<String>) -> Self {
        Self {
            title: SEED_TITLE.to_string(),
            subtitle: String::new(),
            summary: SEED_SUMMARY.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            logo_url: Some(logo_url.into()),
        }
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self { title: title.into(), ..self.clone() }
    }

    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self { summary: summary.into(), ..self.clone() }
    }

    pub fn with_image(&self, image_url: impl Into<String>) -> Self {
        Self { image_url: image_url.into(), ..self.clone() }
    }

    pub fn with_logo(&self, logo_url: impl Into<Option<String>>) -> Self {
        Self { logo_url: logo_url.into(), ..self.clone() }
    }

    /// The logo to draw, if there is one worth drawing (blank strings count as none).
    pub fn logo(&self) -> Option<&str> {
        self.logo_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Returns `true` if `url` cannot stand in for a real background photo.
pub fn is_placeholder(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url.to_ascii_lowercase().contains(PLACEHOLDER_MARKER)
}

/// Picks the background photo for a record: the candidate when it looks like
/// a real image, otherwise [`DEFAULT_IMAGE_URL`].
pub fn resolve_image_url(candidate: Option<&str>) -> String {
    match candidate {
        Some(url) if !is_placeholder(url) => url.trim().to_string(),
        Some(url) => {
            tracing::debug!(image_url = url, "Replacing placeholder image with the default stock photo");
            DEFAULT_IMAGE_URL.to_string()
        },
        None => DEFAULT_IMAGE_URL.to_string(),
    }
}
