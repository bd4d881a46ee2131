//! Card rasterization through headless Chrome/Chromium.
//!
//! A [`Composition`] becomes a [`Document`], the document is written to a
//! temporary directory together with its stylesheets, and Chrome screenshots it
//! at the requested device pixel ratio. The PNG is checked against the expected
//! geometry before it is handed back.

mod assets;
mod chrome;
mod document;
pub mod error;
mod png;
mod render;
mod style;

pub use crate::assets::{Builtins, CARD_STYLESHEET};
use crate::chrome::Chrome;
pub use crate::document::Document;
use crate::error::{Error, Result};
pub use crate::png::Png;
pub use crate::style::{CssVariables, StyleConfig, variables::CssValue};
use instanews_layout::Composition;
use std::path::PathBuf;

/// Device pixels per CSS pixel for every export.
pub const PIXEL_RATIO: u32 = 2;

/// Anything that can turn a composition into a PNG.
pub trait Rasterize: Send + Sync {
    /// Rasterizes `composition` at `width`x`height` CSS pixels and `pixel_ratio` device pixels per CSS pixel.
    fn rasterize(&self, composition: &Composition, width: u32, height: u32, pixel_ratio: u32) -> Result<Png>;
}

pub struct Renderer {
    chrome: Chrome,
    styles: StyleConfig,
}
impl Renderer {
    /// Uses the first Chrome/Chromium found on this system.
    pub fn new(styles: StyleConfig) -> Result<Self> {
        Ok(Self { chrome: Chrome::discover()?, styles })
    }

    /// Uses the Chrome/Chromium executable at `path`.
    pub fn with_chrome(path: impl Into<PathBuf>, styles: StyleConfig) -> Result<Self> {
        Ok(Self { chrome: Chrome::at(path)?, styles })
    }
}
impl TryFrom<StyleConfig> for Renderer {
    type Error = Error;
    fn try_from(styles: StyleConfig) -> std::result::Result<Self, Self::Error> {
        Renderer::new(styles)
    }
}
