//! Pure card layout.
//!
//! [`layout`] maps a [`ContentRecord`], a [`Format`] and the logo toggle to a
//! [`Composition`]. The same inputs always produce the same composition, and
//! nothing here touches the network, the filesystem, or a clock.

mod composition;
pub mod error;
mod format;
pub mod text;

pub use crate::composition::{
    Accent, BadgeRow, Color, Composition, Fit, Gradient, Headline, ImageBand, Logo, LogoMark, Photo, Rect, Rule,
    Shadow, Summary, TextBand,
};
pub use crate::format::{CANVAS_WIDTH, Format, Size};
pub use crate::text::HeadlineTier;
use instanews_content::{ContentRecord, DEFAULT_IMAGE_URL};

pub const BACKGROUND: Color = Color::rgb(0x05, 0x0a, 0x1d);
pub const ACCENT: Color = Color::rgb(0xdc, 0x26, 0x26);
const SUMMARY_COLOR: Color = Color::rgb(0xcb, 0xd5, 0xe1);
const SHADOW_COLOR: Color = Color::rgba(0, 0, 0, 80);

const TEXT_PADDING: u32 = 80;
const LOGO_INSET: u32 = 56;
const LOGO_HEIGHT: u32 = 176;
const LOGO_BADGE_FONT: u32 = 30;
const LOGO_BADGE_PADDING: u32 = 24;
const BADGE_FONT: u32 = 24;
const SUMMARY_FONT: u32 = 30;
const SUMMARY_MAX_LINES: usize = 3;
/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;

/// Station identity printed on every card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branding {
    /// Shown in the fallback logo badge.
    pub short_code: String,
    /// Shown in the red badge above the headline.
    pub badge_label: String,
}
impl Default for Branding {
    fn default() -> Self {
        Self { short_code: "ND".to_string(), badge_label: "Urgente".to_string() }
    }
}

/// Lays out cards for one station.
#[derive(Clone, Debug, Default)]
pub struct Composer {
    branding: Branding,
}

impl Composer {
    pub fn new(branding: Branding) -> Self {
        Self { branding }
    }

    pub fn compose(&self, content: &ContentRecord, format: Format, show_logo: bool) -> Composition {
        let canvas = format.canvas();
        let image_height = (canvas.height as f32 * format.image_band_ratio()).round() as u32;
        let image_frame = Rect { x: 0, y: 0, width: canvas.width, height: image_height };
        let text_frame = Rect { x: 0, y: image_height, width: canvas.width, height: canvas.height - image_height };

        Composition {
            format,
            canvas,
            background: BACKGROUND,
            image_band: ImageBand {
                frame: image_frame,
                photo: Photo { src: photo_src(content), fit: Fit::Cover, centered: true },
                gradient: Gradient { from: BACKGROUND, to: Color::TRANSPARENT, stop: 50 },
                logo: show_logo.then(|| self.logo(content)),
            },
            text_band: TextBand {
                frame: text_frame,
                padding: TEXT_PADDING,
                badge: self.badge_row(),
                headline: headline(&content.title),
                summary: summary(&content.summary, canvas.width - 2 * TEXT_PADDING),
                accent: Accent { width: 160, height: 6, fill: ACCENT, margin_top: 48 },
            },
        }
    }

    fn logo(&self, content: &ContentRecord) -> Logo {
        let mark = match content.logo() {
            Some(src) => LogoMark::Image { src: src.to_string(), fit: Fit::Contain },
            None => LogoMark::Badge {
                text: self.branding.short_code.clone(),
                font_size: LOGO_BADGE_FONT,
                padding: LOGO_BADGE_PADDING,
                fill: Color::WHITE,
            },
        };
        Logo {
            mark,
            top: LOGO_INSET,
            right: LOGO_INSET,
            height: LOGO_HEIGHT,
            shadow: Shadow { offset_y: 15, blur: 30, color: SHADOW_COLOR },
        }
    }

    fn badge_row(&self) -> BadgeRow {
        BadgeRow {
            label: self.branding.badge_label.clone(),
            font_size: BADGE_FONT,
            padding_x: 24,
            padding_y: 8,
            fill: ACCENT,
            gap: 24,
            rule: Rule { thickness: 2, color: Color::WHITE.with_alpha(20) },
            margin_bottom: 32,
        }
    }
}

/// Lays out `content` with the default branding.
pub fn layout(content: &ContentRecord, format: Format, show_logo: bool) -> Composition {
    Composer::default().compose(content, format, show_logo)
}

fn photo_src(content: &ContentRecord) -> String {
    match content.image_url.trim() {
        "" => DEFAULT_IMAGE_URL.to_string(),
        src => src.to_string(),
    }
}

/// The tier is chosen from the text actually drawn, after trimming.
fn headline(title: &str) -> Headline {
    let text = title.trim();
    let tier = HeadlineTier::for_title(text);
    Headline { text: text.to_string(), tier, font_size: tier.font_size(), line_height: 1.05, margin_bottom: 40 }
}

/// Columns of summary text that fit in `inner_width`.
fn summary_columns(inner_width: u32) -> usize {
    (inner_width as f32 / (SUMMARY_FONT as f32 * GLYPH_ADVANCE)).floor() as usize
}

fn summary(text: &str, inner_width: u32) -> Summary {
    let (lines, truncated) = text::clamp(text, summary_columns(inner_width), SUMMARY_MAX_LINES);
    Summary {
        lines,
        truncated,
        font_size: SUMMARY_FONT,
        line_height: 1.625,
        color: SUMMARY_COLOR,
        italic: true,
        max_lines: SUMMARY_MAX_LINES,
    }
}
