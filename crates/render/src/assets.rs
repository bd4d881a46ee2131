//! Embedded assets for rendering.
//!
//! Stylesheets and the card template are embedded into the binary at compile
//! time using [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::borrow::Cow;

/// Name of the template every card is rendered from.
pub(crate) const CARD_TEMPLATE: &str = "card.html";
/// Name of the stylesheet every card is rendered with.
pub const CARD_STYLESHEET: &str = "card.css";

#[derive(Embed)]
#[folder = "../../assets/styles/"]
pub struct Builtins;
impl Builtins {
    /// Get the CSS content for a builtin style by name.
    pub fn load(name: impl AsRef<str>) -> Result<Cow<'static, [u8]>> {
        Self::get(name.as_ref()).map(|f| f.data).ok_or_raise(|| ErrorKind::AssetNotFound(Self::identifier(name)))
    }

    pub(crate) fn identifier(name: impl AsRef<str>) -> String {
        format!("builtin:{}", name.as_ref().trim().trim_start_matches("builtin:"))
    }
}

#[derive(Embed)]
#[folder = "../../assets/templates/"]
pub(crate) struct Templates;
impl Templates {
    pub(crate) fn load(name: &str) -> Result<String> {
        let data = Self::get(name).map(|f| f.data).ok_or_raise(|| ErrorKind::AssetNotFound(format!("template:{name}")))?;
        String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_load_card_style() {
        let css = Builtins::load(CARD_STYLESHEET).unwrap();
        assert!(!css.is_empty());
    }

    #[test]
    fn card_style_is_embedded() {
        assert!(Builtins::get(CARD_STYLESHEET).is_some());
    }

    #[test]
    fn unknown_builtin_is_not_found() {
        let err = Builtins::load("missing.css").unwrap_err();
        assert_eq!(*err, ErrorKind::AssetNotFound("builtin:missing.css".to_string()));
    }

    #[test]
    fn can_load_card_template() {
        let template = Templates::load(CARD_TEMPLATE).unwrap();
        assert!(template.contains("</head>"));
    }
}
