//! CSS custom properties (variables) for rendered cards.
//!
//! [`CssVariables`] is rendered as a `<style>` block setting `:root` custom
//! properties prefixed with `--card-`. The card stylesheet reads all of its
//! geometry and colours from these, so the composition stays the single
//! source of truth for layout.

use instanews_layout::{Composition, LogoMark};
use rslug::slugify;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A single custom property value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssValue {
    /// Emitted as-is: lengths, colours, keywords.
    Raw(String),
    /// Emitted as a quoted CSS string.
    Text(String),
}
impl CssValue {
    fn px(value: u32) -> Self {
        Self::Raw(format!("{value}px"))
    }

    fn raw(value: impl ToString) -> Self {
        Self::Raw(value.to_string())
    }
}
impl Display for CssValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Raw(value) => f.write_str(value),
            Self::Text(value) => write!(f, "\"{}\"", css_escape_string(value)),
        }
    }
}

/// A set of CSS custom properties injected as `:root` variables.
///
/// Each entry becomes `--card-{key}: {value};`. Keys are emitted in sorted
/// order so the same composition always yields the same block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssVariables {
    variables: BTreeMap<String, CssValue>,
}

impl CssVariables {
    pub fn get(&self, key: &str) -> Option<&CssValue> {
        self.variables.get(key)
    }
}
impl<K: Into<String>> FromIterator<(K, CssValue)> for CssVariables {
    fn from_iter<T: IntoIterator<Item = (K, CssValue)>>(iter: T) -> Self {
        let variables = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self { variables }
    }
}
impl From<&Composition> for CssVariables {
    fn from(c: &Composition) -> Self {
        let image = &c.image_band;
        let text = &c.text_band;
        let mut variables = vec![
            ("width", CssValue::px(c.canvas.width)),
            ("height", CssValue::px(c.canvas.height)),
            ("background", CssValue::raw(c.background)),
            ("image-height", CssValue::px(image.frame.height)),
            ("text-height", CssValue::px(text.frame.height)),
            ("text-padding", CssValue::px(text.padding)),
            ("gradient-from", CssValue::raw(image.gradient.from)),
            ("gradient-to", CssValue::raw(image.gradient.to)),
            ("gradient-stop", CssValue::Raw(format!("{}%", image.gradient.stop))),
            ("badge-font-size", CssValue::px(text.badge.font_size)),
            ("badge-padding-x", CssValue::px(text.badge.padding_x)),
            ("badge-padding-y", CssValue::px(text.badge.padding_y)),
            ("badge-fill", CssValue::raw(text.badge.fill)),
            ("badge-gap", CssValue::px(text.badge.gap)),
            ("badge-margin-bottom", CssValue::px(text.badge.margin_bottom)),
            ("badge-label", CssValue::Text(text.badge.label.clone())),
            ("rule-thickness", CssValue::px(text.badge.rule.thickness)),
            ("rule-color", CssValue::raw(text.badge.rule.color)),
            ("headline-font-size", CssValue::px(text.headline.font_size)),
            ("headline-line-height", CssValue::raw(text.headline.line_height)),
            ("headline-margin-bottom", CssValue::px(text.headline.margin_bottom)),
            ("summary-font-size", CssValue::px(text.summary.font_size)),
            ("summary-line-height", CssValue::raw(text.summary.line_height)),
            ("summary-color", CssValue::raw(text.summary.color)),
            ("summary-font-style", CssValue::raw(if text.summary.italic { "italic" } else { "normal" })),
            ("accent-width", CssValue::px(text.accent.width)),
            ("accent-height", CssValue::px(text.accent.height)),
            ("accent-fill", CssValue::raw(text.accent.fill)),
            ("accent-margin-top", CssValue::px(text.accent.margin_top)),
        ];
        if let Some(logo) = &image.logo {
            variables.extend([
                ("logo-top", CssValue::px(logo.top)),
                ("logo-right", CssValue::px(logo.right)),
                ("logo-height", CssValue::px(logo.height)),
                ("logo-shadow", CssValue::raw(&logo.shadow)),
            ]);
            if let LogoMark::Badge { font_size, padding, fill, .. } = &logo.mark {
                variables.extend([
                    ("logo-badge-font-size", CssValue::px(*font_size)),
                    ("logo-badge-padding", CssValue::px(*padding)),
                    ("logo-badge-fill", CssValue::raw(fill)),
                ]);
            }
        }
        variables.into_iter().collect()
    }
}
impl Display for CssVariables {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "<style>\n:root {{")?;
        for (key, value) in self.variables.iter() {
            writeln!(f, "    --card-{}: {};", slugify!(key), value)?;
        }
        write!(f, "}}\n</style>")
    }
}

/// https://www.w3.org/TR/css-syntax-3/#consume-string-token
fn css_escape_string(value: impl AsRef<str>) -> String {
    value
        .as_ref()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\a ")
        .replace('\r', "\\d ")
        .replace('\x0C', "\\c ")
        .replace('\0', "\\fffd ")
        .replace('<', "\\3c ")
}
