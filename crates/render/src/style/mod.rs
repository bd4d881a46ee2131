//! CSS style management for rendered cards.
//!
//! Styles are assembled through [`StyleConfig`]'s builder API, combining
//! compile-time embedded builtins (such as [`CARD_STYLESHEET`]) with
//! user-provided files or raw CSS content. All styles are read eagerly at
//! construction time so that missing files fail fast rather than at render time.

pub(crate) mod variables;

pub use self::variables::CssVariables;
use crate::assets::{Builtins, CARD_STYLESHEET};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::borrow::Cow;
use std::fmt::{Result as FmtResult, Write};
use std::path::Path;

#[derive(Clone, Debug)]
enum Style {
    Builtin(Cow<'static, [u8]>),
    UserContent(String),
}
impl Style {
    fn write_all_to(&self, w: &mut impl Write) -> FmtResult {
        let content = match self {
            Self::Builtin(bytes) => String::from_utf8_lossy(bytes),
            Self::UserContent(content) => Cow::Borrowed(content.as_str()),
        };
        w.write_str("<style>")?;
        w.write_str(&content)?;
        w.write_str("</style>\n")
    }
}

/// An ordered collection of CSS stylesheets to inject into rendered cards.
///
/// Styles are applied in insertion order, so later styles override earlier ones.
///
/// # Example
///
/// ```no_run
/// use instanews_render::StyleConfig;
/// # use instanews_render::error::Result;
///
/// # fn get_styles() -> Result<StyleConfig> {
/// let styles = StyleConfig::card()?.with_file("/path/to/station.css")?;
/// # Ok(styles)
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct StyleConfig {
    styles: Vec<Style>,
}
impl StyleConfig {
    /// Creates an empty style configuration with no stylesheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin card stylesheet on its own.
    pub fn card() -> Result<Self> {
        Self::new().with_builtin(CARD_STYLESHEET)
    }

    /// The builtin card stylesheet followed by each file in `paths`.
    pub fn card_with_files<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        paths.into_iter().try_fold(Self::card()?, |styles, path| styles.with_file(path))
    }

    /// Appends a builtin stylesheet by name.
    ///
    /// Returns [`ErrorKind::AssetNotFound`] if `name` does not match any
    /// embedded asset.
    pub fn with_builtin(mut self, name: impl AsRef<str>) -> Result<Self> {
        let content = Builtins::load(name)?;
        self.styles.push(Style::Builtin(content));
        Ok(self)
    }

    /// Appends a stylesheet read from a file on disk.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            exn::bail!(ErrorKind::AssetNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).or_raise(|| ErrorKind::Io)?;
        tracing::debug!(path = %path.display(), "Loaded user stylesheet");
        self.styles.push(Style::UserContent(content));
        Ok(self)
    }

    /// Appends raw CSS content as a stylesheet.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.styles.push(Style::UserContent(content.into()));
        self
    }

    pub(crate) fn write_all_to(&self, w: &mut impl Write) -> std::result::Result<usize, std::fmt::Error> {
        for style in &self.styles {
            style.write_all_to(w)?;
        }
        Ok(self.styles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn card_includes_builtin() {
        let styles = StyleConfig::card().unwrap();
        let mut out = String::new();
        assert_eq!(styles.write_all_to(&mut out).unwrap(), 1);
        assert!(out.starts_with("<style>"));
        assert!(out.contains(".headline"));
    }

    #[test]
    fn later_styles_come_last() {
        let styles = StyleConfig::card().unwrap().with_content(".badge { color: lime; }");
        let mut out = String::new();
        styles.write_all_to(&mut out).unwrap();
        assert!(out.trim_end().ends_with(".badge { color: lime; }</style>"));
    }

    #[test]
    fn user_file_is_read_eagerly() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b".summary { color: red; }").unwrap();
        let styles = StyleConfig::card_with_files([file.path()]).unwrap();
        drop(file);
        let mut out = String::new();
        assert_eq!(styles.write_all_to(&mut out).unwrap(), 2);
        assert!(out.contains(".summary { color: red; }"));
    }

    #[test]
    fn missing_file_fails_fast() {
        let err = StyleConfig::new().with_file("/nonexistent/station.css").unwrap_err();
        assert!(matches!(&*err, ErrorKind::AssetNotFound(_)));
    }
}
