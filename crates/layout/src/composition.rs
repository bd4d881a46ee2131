//! The layout descriptor handed to the renderer.
//!
//! Everything here is plain data: absolute lengths in CSS pixels at the
//! reference canvas width, colours, and already-fitted text. The renderer turns
//! it into a document without making any layout decisions of its own.

use crate::format::{Format, Size};
use crate::text::HeadlineTier;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An sRGB colour with an alpha percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub rgb: [u8; 3],
    /// Opacity, 0 to 100.
    pub alpha: u8,
}
impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b], alpha: 100 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        Self { rgb: [r, g, b], alpha }
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { rgb: self.rgb, alpha }
    }
}
impl Display for Color {
    /// CSS notation: `#rrggbb` when opaque, `rgba(...)` otherwise.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let [r, g, b] = self.rgb;
        match self.alpha {
            a if a >= 100 => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            a => write!(f, "rgba({r}, {g}, {b}, {})", f32::from(a) / 100.0),
        }
    }
}
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An axis-aligned box, origin at the top-left of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
impl Rect {
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the box, cropping overflow.
    Cover,
    /// Fit inside the box, preserving aspect ratio.
    Contain,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub src: String,
    pub fit: Fit,
    pub centered: bool,
}

/// Linear gradient drawn over the photo, bottom to top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Gradient {
    pub from: Color,
    pub to: Color,
    /// Percentage of the band height at which `to` is reached.
    pub stop: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Shadow {
    pub offset_y: u32,
    pub blur: u32,
    pub color: Color,
}
impl Display for Shadow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "0 {}px {}px {}", self.offset_y, self.blur, self.color)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LogoMark {
    /// The station's own artwork.
    Image { src: String, fit: Fit },
    /// White box with the station short code, used when there is no artwork.
    Badge { text: String, font_size: u32, padding: u32, fill: Color },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Logo {
    pub mark: LogoMark,
    /// Inset from the top edge of the canvas.
    pub top: u32,
    /// Inset from the right edge of the canvas.
    pub right: u32,
    pub height: u32,
    pub shadow: Shadow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageBand {
    pub frame: Rect,
    pub photo: Photo,
    pub gradient: Gradient,
    pub logo: Option<Logo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub thickness: u32,
    pub color: Color,
}

/// Label badge and the rule next to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BadgeRow {
    pub label: String,
    pub font_size: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub fill: Color,
    pub gap: u32,
    pub rule: Rule,
    pub margin_bottom: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Headline {
    pub text: String,
    pub tier: HeadlineTier,
    pub font_size: u32,
    pub line_height: f32,
    pub margin_bottom: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Display lines after wrapping, at most `max_lines`.
    pub lines: Vec<String>,
    pub truncated: bool,
    pub font_size: u32,
    pub line_height: f32,
    pub color: Color,
    pub italic: bool,
    pub max_lines: usize,
}
impl Summary {
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Accent {
    pub width: u32,
    pub height: u32,
    pub fill: Color,
    pub margin_top: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBand {
    pub frame: Rect,
    pub padding: u32,
    pub badge: BadgeRow,
    pub headline: Headline,
    pub summary: Summary,
    pub accent: Accent,
}

/// A fully laid-out card.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Composition {
    pub format: Format,
    pub canvas: Size,
    pub background: Color,
    pub image_band: ImageBand,
    pub text_band: TextBand,
}
