//! The canonical news content record shared by every other crate.
//!
//! - [`ContentRecord`] holds title, subtitle, summary, background photo and
//!   logo. Edits produce copies.
//! - [`resolve_image_url`] guarantees a record always points at a renderable
//!   photo, substituting [`DEFAULT_IMAGE_URL`] for empty or placeholder URLs.
//! - [`ImageUpload`] validates local image files and embeds them as `data:` URIs.

pub mod error;
mod record;
mod upload;

pub use crate::record::{
    ContentRecord, DEFAULT_IMAGE_URL, DEFAULT_LOGO_URL, PLACEHOLDER_MARKER, is_placeholder, resolve_image_url,
};
pub use crate::upload::{ImageUpload, MediaType};
