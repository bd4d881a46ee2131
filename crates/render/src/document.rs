//! Standalone HTML page for a single card.

use crate::assets::{CARD_TEMPLATE, Templates};
use crate::error::{ErrorKind, Result};
use crate::style::{CssVariables, StyleConfig};
use exn::ResultExt;
use instanews_layout::{Composition, LogoMark};
use serde::Serialize;
use std::fmt::Write;
use tracing::instrument;
use upon::Engine;

/// Everything the card template reads. Text is raw here and escaped by the template.
#[derive(Serialize)]
struct Parameters<'a> {
    format: &'static str,
    photo: &'a str,
    has_logo: bool,
    logo_is_image: bool,
    logo_src: &'a str,
    short_code: &'a str,
    badge: &'a str,
    tier: &'static str,
    headline: &'a str,
    summary: &'a [String],
}
impl<'a> From<&'a Composition> for Parameters<'a> {
    fn from(c: &'a Composition) -> Self {
        let logo = c.image_band.logo.as_ref().map(|logo| &logo.mark);
        let (logo_src, short_code) = match logo {
            Some(LogoMark::Image { src, .. }) => (src.as_str(), ""),
            Some(LogoMark::Badge { text, .. }) => ("", text.as_str()),
            None => ("", ""),
        };
        Self {
            format: c.format.as_str(),
            photo: &c.image_band.photo.src,
            has_logo: logo.is_some(),
            logo_is_image: matches!(logo, Some(LogoMark::Image { .. })),
            logo_src,
            short_code,
            badge: &c.text_band.badge.label,
            tier: c.text_band.headline.tier.as_str(),
            headline: &c.text_band.headline.text,
            summary: &c.text_band.summary.lines,
        }
    }
}

/// A card rendered to HTML, before any stylesheet is attached.
#[derive(Clone, Debug)]
pub struct Document {
    html: String,
    variables: CssVariables,
}

impl Document {
    #[instrument(skip_all, fields(format = %composition.format))]
    pub fn new(composition: &Composition) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(Templates::load(CARD_TEMPLATE)?).or_raise(|| ErrorKind::Template)?;
        let html = template
            .render(&engine, Parameters::from(composition))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Ok(Self { html, variables: CssVariables::from(composition) })
    }

    /// The page without styles.
    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// The page with the card variables and `styles` injected before `</head>`.
    pub fn with_styles(&self, styles: &StyleConfig) -> Result<String> {
        const NEEDLE: &[u8] = b"</head";
        let Some(pos) = self.html.as_bytes().windows(NEEDLE.len()).position(|w| w.eq_ignore_ascii_case(NEEDLE))
        else {
            tracing::warn!("Card stylesheets not injected; closing head tag not found");
            return Ok(self.html.clone());
        };
        let mut out = String::with_capacity(self.html.len() + 16 * 1024);
        out.push_str(&self.html[..pos]);
        writeln!(out, "{}", self.variables).or_raise(|| ErrorKind::Io)?;
        let blocks = styles.write_all_to(&mut out).or_raise(|| ErrorKind::Io)?;
        out.push_str(&self.html[pos..]);
        tracing::debug!(position = pos, blocks = blocks + 1, "Card stylesheets injected into HTML");
        Ok(out)
    }
}

/// Custom [`upon`] extensions for markup-safe output.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    pub(crate) fn escape_html(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                c => out.push(c),
            }
        }
        out
    }

    /// Escapes strings for use in element content and quoted attributes.
    fn html_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", escape_html(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Registers the `html` formatter on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("html", html_formatter);
    }
}
